use chrono::{DateTime, Utc};
use schoolgate_core::{
    AccountStore, CredentialVerifier, ExternalIdentity, IssuedToken, TokenCodec, TokenIssueError,
};

use crate::identity_linker::{IdentityLinker, LinkError};

#[derive(Debug, thiserror::Error)]
pub enum ExternalSignInError {
    #[error("Identity linking failed: {0}")]
    LinkError(#[from] LinkError),
    #[error("Token issue error: {0}")]
    TokenIssueError(#[from] TokenIssueError),
}

/// External sign-in use case - mints a token for an identity vouched for by a provider
pub struct ExternalSignInUseCase<A, V, T>
where
    A: AccountStore,
    V: CredentialVerifier,
    T: TokenCodec,
{
    linker: IdentityLinker<A, V>,
    codec: T,
}

impl<A, V, T> ExternalSignInUseCase<A, V, T>
where
    A: AccountStore,
    V: CredentialVerifier,
    T: TokenCodec,
{
    pub fn new(accounts: A, credentials: V, codec: T) -> Self {
        Self {
            linker: IdentityLinker::new(accounts, credentials),
            codec,
        }
    }

    /// Execute the external sign-in use case
    ///
    /// # Arguments
    /// * `identity` - Claims asserted by the external identity provider
    /// * `now` - Issue time of the minted token
    #[tracing::instrument(name = "ExternalSignInUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        identity: ExternalIdentity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, ExternalSignInError> {
        let account = self.linker.resolve(identity, now).await?;
        let issued = self.codec.mint(&account, now)?;
        tracing::info!(account_id = %account.id(), token_id = %issued.token_id, "Token issued");
        Ok(issued)
    }
}
