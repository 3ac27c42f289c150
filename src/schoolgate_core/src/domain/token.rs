use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Random per-mint identifier (`jti`). Revocation is keyed on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed claim set. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: TokenId,
    pub scope: String,
    pub email: String,
    #[serde(rename = "emailVerified")]
    pub email_verified: bool,
    #[serde(rename = "googleId", default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Last instant at which the token is still refreshable.
    pub fn refreshable_until(&self, refreshable_secs: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat.saturating_add(refreshable_secs), 0)
    }

    /// When a deny-list entry for this token may be dropped: the later of the access
    /// expiry and the end of the refresh window.
    pub fn revocation_horizon(&self, refreshable_secs: i64) -> DateTime<Utc> {
        let end = self.exp.max(self.iat.saturating_add(refreshable_secs));
        DateTime::from_timestamp(end, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: Secret<String>,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Effective expiry is `exp`.
    Access,
    /// Effective expiry is `iat + refreshable duration`.
    Refresh,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("Token signature does not match")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token is malformed")]
    Malformed,
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("Failed to sign token: {0}")]
    Signing(String),
    #[error("Token timestamps out of range")]
    TimestampOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedTokenEntry {
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    AlreadyRevoked,
}
