use chrono::{DateTime, Utc};
use schoolgate_core::{
    RevocationStore, RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenId,
};
use serde::Deserialize;

use super::{
    hashmap_revocation_store::HashMapRevocationStore,
    postgres_revocation_store::PostgresRevocationStore,
    redis_revocation_store::RedisRevocationStore,
};

/// Which deny-list implementation the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationBackendKind {
    Redis,
    Postgres,
    Memory,
}

/// Revocation store chosen at start-up.
#[derive(Clone)]
pub enum RevocationBackend {
    Redis(RedisRevocationStore),
    Postgres(PostgresRevocationStore),
    Memory(HashMapRevocationStore),
}

impl RevocationBackend {
    pub fn kind(&self) -> RevocationBackendKind {
        match self {
            RevocationBackend::Redis(_) => RevocationBackendKind::Redis,
            RevocationBackend::Postgres(_) => RevocationBackendKind::Postgres,
            RevocationBackend::Memory(_) => RevocationBackendKind::Memory,
        }
    }
}

#[async_trait::async_trait]
impl RevocationStore for RevocationBackend {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError> {
        match self {
            RevocationBackend::Redis(store) => store.is_revoked(token_id).await,
            RevocationBackend::Postgres(store) => store.is_revoked(token_id).await,
            RevocationBackend::Memory(store) => store.is_revoked(token_id).await,
        }
    }

    async fn revoke(
        &self,
        entry: RevokedTokenEntry,
    ) -> Result<RevokeOutcome, RevocationStoreError> {
        match self {
            RevocationBackend::Redis(store) => store.revoke(entry).await,
            RevocationBackend::Postgres(store) => store.revoke(entry).await,
            RevocationBackend::Memory(store) => store.revoke(entry).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        match self {
            RevocationBackend::Redis(store) => store.purge_expired(now).await,
            RevocationBackend::Postgres(store) => store.purge_expired(now).await,
            RevocationBackend::Memory(store) => store.purge_expired(now).await,
        }
    }
}
