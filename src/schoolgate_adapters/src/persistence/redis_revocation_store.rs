use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::Connection;
use schoolgate_core::{
    Clock, RevocationStore, RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenId,
};
use tokio::sync::RwLock;

/// Deny-list in Redis. Each entry is a key with a TTL reaching to its expiry, so Redis
/// drops expired entries on its own. The TTL is measured against `clock`, the same
/// clock that stamped the entry.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: Arc<RwLock<Connection>>,
    clock: Arc<dyn Clock>,
}

impl RedisRevocationStore {
    pub fn new(conn: Arc<RwLock<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    #[tracing::instrument(name = "Checking token revocation in Redis", skip_all)]
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError> {
        let key = get_key(token_id);
        let mut conn = self.conn.write().await;
        redis::cmd("EXISTS")
            .arg(&key)
            .query::<bool>(&mut *conn)
            .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(
        name = "Revoking token in Redis",
        skip_all,
        fields(token_id = %entry.token_id)
    )]
    async fn revoke(
        &self,
        entry: RevokedTokenEntry,
    ) -> Result<RevokeOutcome, RevocationStoreError> {
        let key = get_key(&entry.token_id);
        let ttl = ttl_seconds(entry.expires_at, self.clock.now());

        let mut conn = self.conn.write().await;
        let reply = redis::cmd("SET")
            .arg(&key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query::<Option<String>>(&mut *conn)
            .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        match reply {
            Some(_) => Ok(RevokeOutcome::Revoked),
            None => Ok(RevokeOutcome::AlreadyRevoked),
        }
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        Ok(0)
    }
}

// We are using a key prefix to prevent collisions and organize data!
const REVOKED_TOKEN_KEY_PREFIX: &str = "revoked_token:";

fn get_key(token_id: &TokenId) -> String {
    format!("{}{}", REVOKED_TOKEN_KEY_PREFIX, token_id)
}

/// Redis rejects a non-positive EX, so an entry whose expiry already passed lives
/// for one second.
fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (expires_at - now).num_seconds().max(1) as u64
}
