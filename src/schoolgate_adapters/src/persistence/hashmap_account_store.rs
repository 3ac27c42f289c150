use std::{collections::HashMap, sync::Arc};

use schoolgate_core::{
    Account, AccountId, AccountStore, AccountStoreError, Email, ExternalId, VerificationToken,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    by_email: HashMap<Email, AccountId>,
    by_external_id: HashMap<ExternalId, AccountId>,
    by_verification_token: HashMap<String, AccountId>,
}

impl Tables {
    fn live(&self, id: Option<&AccountId>) -> Option<Account> {
        id.and_then(|id| self.accounts.get(id))
            .filter(|account| !account.is_deleted())
            .cloned()
    }

    fn unindex(&mut self, account: &Account) {
        self.by_email.remove(account.email());
        if let Some(external_id) = account.external_id() {
            self.by_external_id.remove(external_id);
        }
        if let Some(pending) = account.pending_verification() {
            self.by_verification_token.remove(pending.token.as_str());
        }
    }

    fn index(&mut self, account: &Account) {
        let id = *account.id();
        self.by_email.insert(account.email().clone(), id);
        if let Some(external_id) = account.external_id() {
            self.by_external_id.insert(external_id.clone(), id);
        }
        if let Some(pending) = account.pending_verification() {
            self.by_verification_token
                .insert(pending.token.as_str().to_owned(), id);
        }
    }
}

/// In-memory account store. Only non-deleted accounts are indexed, which is what
/// scopes the uniqueness of email and external id.
#[derive(Default, Clone)]
pub struct HashMapAccountStore {
    tables: Arc<RwLock<Tables>>,
}

impl HashMapAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for HashMapAccountStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.tables.read().await.live(Some(id)))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountStoreError> {
        let tables = self.tables.read().await;
        Ok(tables.live(tables.by_email.get(email)))
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Account>, AccountStoreError> {
        let tables = self.tables.read().await;
        Ok(tables.live(tables.by_external_id.get(external_id)))
    }

    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<Account>, AccountStoreError> {
        let tables = self.tables.read().await;
        Ok(tables.live(tables.by_verification_token.get(token.as_str())))
    }

    async fn upsert(&self, account: &Account) -> Result<(), AccountStoreError> {
        let mut tables = self.tables.write().await;
        let id = account.id();

        if !account.is_deleted() {
            if tables
                .by_email
                .get(account.email())
                .is_some_and(|owner| owner != id)
            {
                return Err(AccountStoreError::EmailTaken);
            }
            if let Some(external_id) = account.external_id() {
                if tables
                    .by_external_id
                    .get(external_id)
                    .is_some_and(|owner| owner != id)
                {
                    return Err(AccountStoreError::ExternalIdTaken);
                }
            }
        }

        if let Some(previous) = tables.accounts.get(id).cloned() {
            if !previous.is_deleted() {
                tables.unindex(&previous);
            }
        }
        if !account.is_deleted() {
            tables.index(account);
        }
        tables.accounts.insert(*id, account.clone());

        Ok(())
    }
}
