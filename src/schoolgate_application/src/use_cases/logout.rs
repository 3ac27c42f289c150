use chrono::{DateTime, Utc};
use schoolgate_core::{
    RevocationStore, RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenCodec,
    TokenRejection, VerifyMode,
};
use secrecy::{ExposeSecret, Secret};

/// Error types for logout use case
#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    #[error("Revocation store error: {0}")]
    RevocationStoreError(#[from] RevocationStoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    Revoked,
    AlreadyRevoked,
    /// The token did not verify, so there was nothing to revoke.
    Ignored(TokenRejection),
}

/// Logout use case - invalidates a token for the rest of its lifetime
pub struct LogoutUseCase<R, T>
where
    R: RevocationStore,
    T: TokenCodec,
{
    revocations: R,
    codec: T,
}

impl<R, T> LogoutUseCase<R, T>
where
    R: RevocationStore,
    T: TokenCodec,
{
    pub fn new(revocations: R, codec: T) -> Self {
        Self { revocations, codec }
    }

    /// Execute the logout use case
    ///
    /// The token is verified in refresh mode, so a token past its access expiry but
    /// still refreshable can be logged out.
    ///
    /// # Arguments
    /// * `token` - The presented token
    /// * `now` - Instant the request is evaluated at
    ///
    /// # Returns
    /// Whether the token was newly revoked, already revoked, or ignored because it
    /// no longer verifies
    #[tracing::instrument(name = "LogoutUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: &Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<LogoutOutcome, LogoutError> {
        let claims = match self
            .codec
            .verify(token.expose_secret(), now, VerifyMode::Refresh)
        {
            Ok(claims) => claims,
            Err(rejection) => {
                tracing::debug!(%rejection, "Logout with unusable token ignored");
                return Ok(LogoutOutcome::Ignored(rejection));
            }
        };

        let expires_at = claims.revocation_horizon(self.codec.refreshable_secs());
        let entry = RevokedTokenEntry {
            token_id: claims.jti,
            expires_at,
        };

        let outcome = match self.revocations.revoke(entry).await? {
            RevokeOutcome::Revoked => LogoutOutcome::Revoked,
            RevokeOutcome::AlreadyRevoked => LogoutOutcome::AlreadyRevoked,
        };
        Ok(outcome)
    }
}
