use chrono::{DateTime, Utc};
use schoolgate_core::{
    RevocationStore, RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenId,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PostgresRevocationStore {
    pool: PgPool,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RevocationStore for PostgresRevocationStore {
    #[tracing::instrument(name = "Checking token revocation in PostgreSQL", skip_all)]
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token_id = $1)",
        )
        .bind(token_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))
    }

    #[tracing::instrument(
        name = "Revoking token in PostgreSQL",
        skip_all,
        fields(token_id = %entry.token_id)
    )]
    async fn revoke(
        &self,
        entry: RevokedTokenEntry,
    ) -> Result<RevokeOutcome, RevocationStoreError> {
        let result = sqlx::query(
            r#"
                INSERT INTO revoked_tokens (token_id, expires_at)
                VALUES ($1, $2)
                ON CONFLICT (token_id) DO NOTHING
            "#,
        )
        .bind(entry.token_id.as_str())
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Ok(RevokeOutcome::AlreadyRevoked)
        } else {
            Ok(RevokeOutcome::Revoked)
        }
    }

    #[tracing::instrument(name = "Purging expired revocations in PostgreSQL", skip_all)]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
