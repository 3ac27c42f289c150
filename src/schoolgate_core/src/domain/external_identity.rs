use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExternalIdentityError {
    #[error("External identity id is missing")]
    MissingExternalId,
}

/// Subject identifier issued by the external identity provider (the Google `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn parse(raw: &str) -> Result<Self, ExternalIdentityError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExternalIdentityError::MissingExternalId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity payload asserted by an external provider after it authenticated the user.
/// Fields are raw; the identity linker validates them.
#[derive(Debug, Clone, Default)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
