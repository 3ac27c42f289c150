pub mod bcrypt_credential_verifier;

pub use bcrypt_credential_verifier::{BCRYPT_COST, BcryptCredentialVerifier};
