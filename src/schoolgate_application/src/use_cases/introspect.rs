use chrono::{DateTime, Utc};
use schoolgate_core::{RevocationStore, RevocationStoreError, TokenCodec, VerifyMode};
use secrecy::{ExposeSecret, Secret};

/// Introspect use case - answers whether a token is currently usable as an access token
pub struct IntrospectUseCase<R, T>
where
    R: RevocationStore,
    T: TokenCodec,
{
    revocations: R,
    codec: T,
}

impl<R, T> IntrospectUseCase<R, T>
where
    R: RevocationStore,
    T: TokenCodec,
{
    pub fn new(revocations: R, codec: T) -> Self {
        Self { revocations, codec }
    }

    /// `Ok(false)` for any token that fails verification or has been revoked. Only a
    /// revocation store failure is reported as an error.
    #[tracing::instrument(name = "IntrospectUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: &Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, RevocationStoreError> {
        let claims = match self
            .codec
            .verify(token.expose_secret(), now, VerifyMode::Access)
        {
            Ok(claims) => claims,
            Err(rejection) => {
                tracing::debug!(%rejection, "Token rejected");
                return Ok(false);
            }
        };

        let revoked = self.revocations.is_revoked(&claims.jti).await?;
        Ok(!revoked)
    }
}
