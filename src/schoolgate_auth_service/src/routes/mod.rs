//! JSON handlers for the `/auth` routes. Each one unpacks its request, calls the
//! [`Authenticator`](schoolgate_application::Authenticator) and lets
//! [`ApiError`](crate::error::ApiError) render failures.

pub mod email_verification;
pub mod google;
pub mod introspect;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod token;

pub use email_verification::{email_verification, resend_verification};
pub use google::google;
pub use introspect::introspect;
pub use logout::logout;
pub use refresh::refresh;
pub use register::register;
pub use token::token;

use secrecy::Secret;
use serde::{Deserialize, Serialize};

/// Request body of the operations that take a single token.
#[derive(Deserialize)]
pub struct TokenBody {
    pub token: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
