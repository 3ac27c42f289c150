use chrono::{DateTime, Utc};
use schoolgate_core::{
    AccountStore, AccountStoreError, CredentialError, CredentialVerifier, Email, EmailClient,
    IssuedToken, Password, TokenCodec, TokenIssueError,
};

use crate::notifications::Notifier;

/// Error types specific to authenticate use case
#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("User not found")]
    UserNotFound,
    #[error("Incorrect credentials")]
    BadCredentials,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Credential error: {0}")]
    CredentialError(#[from] CredentialError),
    #[error("Token issue error: {0}")]
    TokenIssueError(#[from] TokenIssueError),
}

/// Authenticate use case - password sign-in
pub struct AuthenticateUseCase<A, V, T, E>
where
    A: AccountStore,
    V: CredentialVerifier,
    T: TokenCodec,
    E: EmailClient,
{
    accounts: A,
    credentials: V,
    codec: T,
    notifier: Notifier<E>,
}

impl<A, V, T, E> AuthenticateUseCase<A, V, T, E>
where
    A: AccountStore,
    V: CredentialVerifier,
    T: TokenCodec,
    E: EmailClient,
{
    pub fn new(accounts: A, credentials: V, codec: T, notifier: Notifier<E>) -> Self {
        Self {
            accounts,
            credentials,
            codec,
            notifier,
        }
    }

    /// Execute the authenticate use case
    ///
    /// Checks are ordered: account exists, password matches, email is verified.
    /// A sign-in email goes out after minting; its failure does not fail the call.
    ///
    /// # Arguments
    /// * `email` - Address the account was registered with
    /// * `password` - Plaintext candidate checked against the stored hash
    /// * `now` - Issue time of the minted token
    ///
    /// # Returns
    /// The signed token with its id and expiry, or AuthenticateError
    #[tracing::instrument(name = "AuthenticateUseCase::execute", skip(self, email, password))]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthenticateError> {
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthenticateError::UserNotFound)?;

        let stored_hash = account
            .password_hash()
            .ok_or(AuthenticateError::BadCredentials)?;
        if !self.credentials.verify(&password, stored_hash).await? {
            return Err(AuthenticateError::BadCredentials);
        }

        if !account.email_verified() {
            return Err(AuthenticateError::EmailNotVerified);
        }

        let issued = self.codec.mint(&account, now)?;
        tracing::info!(account_id = %account.id(), token_id = %issued.token_id, "Token issued");

        self.notifier.send_sign_in(&account, now).await;

        Ok(issued)
    }
}
