use chrono::{DateTime, Utc};
use schoolgate_core::{
    Account, AccountStore, AccountStoreError, CredentialError, CredentialVerifier, Email,
    EmailClient, Password, PasswordError,
};

use crate::{notifications::Notifier, verification_flow::VerificationFlow};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("User already exists")]
    UserExisted,
    #[error("Invalid password: {0}")]
    PasswordError(#[from] PasswordError),
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Credential error: {0}")]
    CredentialError(#[from] CredentialError),
}

/// Register use case - creates an unverified password account and mails a verification link
pub struct RegisterUseCase<A, V, E>
where
    A: AccountStore,
    V: CredentialVerifier,
    E: EmailClient,
{
    accounts: A,
    credentials: V,
    verification: VerificationFlow<A>,
    notifier: Notifier<E>,
}

impl<A, V, E> RegisterUseCase<A, V, E>
where
    A: AccountStore,
    V: CredentialVerifier,
    E: EmailClient,
{
    pub fn new(
        accounts: A,
        credentials: V,
        verification: VerificationFlow<A>,
        notifier: Notifier<E>,
    ) -> Self {
        Self {
            accounts,
            credentials,
            verification,
            notifier,
        }
    }

    /// Execute the register use case
    ///
    /// # Arguments
    /// * `email` - Address of the new account, must not be taken
    /// * `password` - Plaintext password of at least 8 characters
    /// * `display_name` - Optional name shown to other users
    /// * `now` - Creation time, also the start of the verification token's lifetime
    ///
    /// # Returns
    /// The stored, still unverified account, or RegisterError
    #[tracing::instrument(name = "RegisterUseCase::execute", skip(self, email, password))]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Account, RegisterError> {
        password.ensure_strength()?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(RegisterError::UserExisted);
        }

        let password_hash = self.credentials.hash(&password).await?;
        let display_name = display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        let mut account = Account::new_local(email, password_hash, display_name, now);

        let token = self.verification.issue(&mut account, now).await?;
        tracing::info!(account_id = %account.id(), "Account registered");

        let lifetime_hours = self.verification.policy().lifetime_hours();
        self.notifier
            .send_verification(&account, &token, lifetime_hours)
            .await;

        Ok(account)
    }
}
