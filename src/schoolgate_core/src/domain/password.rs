use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is required")]
    Empty,
    #[error("Password must be at least 8 characters")]
    TooShort,
}

/// A plaintext password candidate. Only non-emptiness is checked on parse so that a
/// short password at sign-in is reported as bad credentials, not as bad input.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    /// Wrap a machine-generated secret, which is never empty.
    pub fn from_generated(secret: Secret<String>) -> Self {
        Self(secret)
    }

    /// Strength rule applied when a password is chosen, not when one is presented.
    pub fn ensure_strength(&self) -> Result<(), PasswordError> {
        if self.0.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        Ok(())
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().is_empty() {
            return Err(PasswordError::Empty);
        }
        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// Output of the slow one-way password hash, as stored on the account.
#[derive(Debug, Clone)]
pub struct PasswordHash(Secret<String>);

impl PasswordHash {
    pub fn new(hash: Secret<String>) -> Self {
        Self(hash)
    }
}

impl AsRef<Secret<String>> for PasswordHash {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
