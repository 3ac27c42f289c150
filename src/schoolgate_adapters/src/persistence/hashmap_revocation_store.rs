use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use schoolgate_core::{
    RevocationStore, RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenId,
};

/// In-memory deny-list.
#[derive(Default, Clone)]
pub struct HashMapRevocationStore {
    entries: Arc<DashMap<TokenId, DateTime<Utc>>>,
}

impl HashMapRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationStore for HashMapRevocationStore {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError> {
        Ok(self.entries.contains_key(token_id))
    }

    async fn revoke(
        &self,
        entry: RevokedTokenEntry,
    ) -> Result<RevokeOutcome, RevocationStoreError> {
        match self.entries.entry(entry.token_id) {
            Entry::Occupied(_) => Ok(RevokeOutcome::AlreadyRevoked),
            Entry::Vacant(vacant) => {
                vacant.insert(entry.expires_at);
                Ok(RevokeOutcome::Revoked)
            }
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
