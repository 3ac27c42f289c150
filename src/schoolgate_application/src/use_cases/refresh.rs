use chrono::{DateTime, Utc};
use schoolgate_core::{
    AccountId, AccountStore, AccountStoreError, IssuedToken, RevocationStore, RevocationStoreError,
    RevokeOutcome, RevokedTokenEntry, TokenCodec, TokenIssueError, TokenRejection, VerifyMode,
};
use secrecy::{ExposeSecret, Secret};

/// Error types for refresh use case
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Token rejected: {0}")]
    Rejected(TokenRejection),
    #[error("Token has been revoked")]
    Revoked,
    #[error("Token subject no longer resolves to an account")]
    UnknownSubject,
    #[error("Revocation store error: {0}")]
    RevocationStoreError(#[from] RevocationStoreError),
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Token issue error: {0}")]
    TokenIssueError(#[from] TokenIssueError),
}

/// Refresh use case - exchanges a refresh-eligible token for a new one, revoking the old
pub struct RefreshUseCase<A, R, T>
where
    A: AccountStore,
    R: RevocationStore,
    T: TokenCodec,
{
    accounts: A,
    revocations: R,
    codec: T,
}

impl<A, R, T> RefreshUseCase<A, R, T>
where
    A: AccountStore,
    R: RevocationStore,
    T: TokenCodec,
{
    pub fn new(accounts: A, revocations: R, codec: T) -> Self {
        Self {
            accounts,
            revocations,
            codec,
        }
    }

    /// The presented token is revoked before anything is minted, with insert-if-absent
    /// semantics: of two concurrent refreshes of one token only one gets `Revoked` back,
    /// the other fails. If the revocation cannot be recorded nothing is minted.
    ///
    /// # Returns
    /// A fresh token for the same account, or RefreshError
    #[tracing::instrument(name = "RefreshUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: &Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, RefreshError> {
        let claims = self
            .codec
            .verify(token.expose_secret(), now, VerifyMode::Refresh)
            .map_err(RefreshError::Rejected)?;

        if self.revocations.is_revoked(&claims.jti).await? {
            return Err(RefreshError::Revoked);
        }

        let entry = RevokedTokenEntry {
            token_id: claims.jti.clone(),
            expires_at: claims.revocation_horizon(self.codec.refreshable_secs()),
        };
        if self.revocations.revoke(entry).await? == RevokeOutcome::AlreadyRevoked {
            tracing::warn!(token_id = %claims.jti, "Concurrent refresh lost the revocation race");
            return Err(RefreshError::Revoked);
        }

        let account_id = AccountId::parse(&claims.sub).map_err(|_| RefreshError::UnknownSubject)?;
        let account = self
            .accounts
            .find_by_id(&account_id)
            .await?
            .ok_or(RefreshError::UnknownSubject)?;

        let issued = self.codec.mint(&account, now)?;
        tracing::info!(
            account_id = %account.id(),
            revoked = %claims.jti,
            issued = %issued.token_id,
            "Token rotated"
        );

        Ok(issued)
    }
}
