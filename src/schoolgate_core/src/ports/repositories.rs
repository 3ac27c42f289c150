use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    account::{Account, AccountId},
    email::Email,
    external_identity::ExternalId,
    token::{RevokeOutcome, RevokedTokenEntry, TokenId},
    verification_token::VerificationToken,
};

// AccountStore port trait and errors
#[derive(Debug, Error)]
pub enum AccountStoreError {
    #[error("Email is already registered")]
    EmailTaken,
    #[error("External id is already linked to another account")]
    ExternalIdTaken,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for AccountStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::EmailTaken, Self::EmailTaken)
                | (Self::ExternalIdTaken, Self::ExternalIdTaken)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Narrow read/write interface over accounts. Soft-deleted accounts are never
/// returned by any lookup.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountStoreError>;
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountStoreError>;
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Account>, AccountStoreError>;
    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<Account>, AccountStoreError>;
    /// Insert or replace the account keyed by its id, as one atomic operation.
    async fn upsert(&self, account: &Account) -> Result<(), AccountStoreError>;
}

// RevocationStore port trait and errors
#[derive(Debug, Error)]
pub enum RevocationStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Deny-list of token ids. Once an id is present it stays present until its
/// `expires_at` has passed.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError>;
    /// Insert if absent. Reports whether this call added the entry.
    async fn revoke(&self, entry: RevokedTokenEntry) -> Result<RevokeOutcome, RevocationStoreError>;
    /// Drop entries with `expires_at <= now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError>;
}
