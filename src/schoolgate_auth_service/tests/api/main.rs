mod email_verification;
mod google;
mod helpers;
mod register;
mod token_lifecycle;
