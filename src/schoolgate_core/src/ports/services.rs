use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    account::Account,
    email::Email,
    password::{Password, PasswordHash},
    token::{IssuedToken, TokenClaims, TokenIssueError, TokenRejection, VerifyMode},
};

/// Port trait for email sending service
#[async_trait]
pub trait EmailClient: Send + Sync {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String>;
}

/// Signs and verifies compact tokens. Pure: never consults revocation state.
pub trait TokenCodec: Send + Sync {
    fn mint(&self, account: &Account, now: DateTime<Utc>) -> Result<IssuedToken, TokenIssueError>;
    fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
        mode: VerifyMode,
    ) -> Result<TokenClaims, TokenRejection>;
    /// Length of the refresh eligibility window, in seconds from issue time.
    fn refreshable_secs(&self) -> i64;
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` for a wrong password or an unreadable stored hash.
    async fn verify(
        &self,
        candidate: &Password,
        stored: &PasswordHash,
    ) -> Result<bool, CredentialError>;
    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
