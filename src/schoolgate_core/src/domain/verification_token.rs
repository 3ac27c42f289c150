use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

/// Single-use secret mailed to a user to prove ownership of their email address.
#[derive(Debug, Clone)]
pub struct VerificationToken(Secret<String>);

impl VerificationToken {
    pub fn generate() -> Self {
        Self(Secret::new(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for VerificationToken {
    fn from(value: String) -> Self {
        Self(Secret::new(value))
    }
}

impl PartialEq for VerificationToken {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for VerificationToken {}
