pub mod account;
pub mod email;
pub mod external_identity;
pub mod password;
pub mod token;
pub mod verification_token;
