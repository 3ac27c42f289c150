use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use schoolgate_core::{
    Account, AccountStore, AccountStoreError, CredentialError, CredentialVerifier, Email,
    ExternalId, ExternalIdentity, Password,
};
use secrecy::Secret;
use thiserror::Error;

const UNUSABLE_PASSWORD_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid external identity: {0}")]
    InvalidIdentity(String),
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
    #[error("Credential error: {0}")]
    CredentialError(#[from] CredentialError),
}

/// Resolves an identity asserted by an external provider to exactly one account,
/// persisting whatever changed on the way.
#[derive(Clone)]
pub struct IdentityLinker<A, V>
where
    A: AccountStore,
    V: CredentialVerifier,
{
    accounts: A,
    credentials: V,
}

impl<A, V> IdentityLinker<A, V>
where
    A: AccountStore,
    V: CredentialVerifier,
{
    pub fn new(accounts: A, credentials: V) -> Self {
        Self {
            accounts,
            credentials,
        }
    }

    /// Lookup order is external id, then email, then create. An email match is merged
    /// into the external identity and cannot be undone.
    #[tracing::instrument(name = "IdentityLinker::resolve", skip_all)]
    pub async fn resolve(
        &self,
        identity: ExternalIdentity,
        now: DateTime<Utc>,
    ) -> Result<Account, LinkError> {
        let external_id = ExternalId::parse(&identity.external_id)
            .map_err(|e| LinkError::InvalidIdentity(e.to_string()))?;
        let email =
            Email::parse(&identity.email).map_err(|e| LinkError::InvalidIdentity(e.to_string()))?;
        let display_name = non_blank(identity.display_name.as_deref());
        let avatar_url = non_blank(identity.avatar_url.as_deref());

        if let Some(mut account) = self.accounts.find_by_external_id(&external_id).await? {
            if account.fill_missing_profile(display_name, avatar_url, now) {
                self.accounts.upsert(&account).await?;
            }
            return Ok(account);
        }

        if let Some(mut account) = self.accounts.find_by_email(&email).await? {
            if let Some(previous) = account.external_id() {
                tracing::warn!(
                    account_id = %account.id(),
                    previous = %previous,
                    "Replacing external id on account matched by email"
                );
            }
            tracing::info!(
                account_id = %account.id(),
                "Linking external identity to existing account"
            );
            account.link_external(external_id, now);
            account.fill_missing_profile(display_name, avatar_url, now);
            self.accounts.upsert(&account).await?;
            return Ok(account);
        }

        let unusable_hash = self.credentials.hash(&unusable_password()).await?;
        let account = Account::new_external(
            external_id,
            email,
            display_name.map(str::to_owned),
            avatar_url.map(str::to_owned),
            unusable_hash,
            now,
        );
        self.accounts.upsert(&account).await?;
        tracing::info!(account_id = %account.id(), "Created account for external identity");

        Ok(account)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A random secret that is hashed and then forgotten.
fn unusable_password() -> Password {
    let secret: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_PASSWORD_LENGTH)
        .map(char::from)
        .collect();
    Password::from_generated(Secret::new(secret))
}
