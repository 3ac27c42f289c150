use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schoolgate_core::{
    Account, AccountId, AccountRecord, AccountStore, AccountStoreError, AuthProvider, Email,
    ExternalId, PasswordHash, Role, VerificationToken,
};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, postgres::PgQueryResult};
use uuid::Uuid;

const EMAIL_CONSTRAINT: &str = "accounts_email_live_key";
const EXTERNAL_ID_CONSTRAINT: &str = "accounts_external_id_live_key";

macro_rules! select_live_account {
    ($filter:literal) => {
        concat!(
            "SELECT id, email, display_name, avatar_url, password_hash, roles, provider, ",
            "external_id, email_verified, verification_token, verification_token_expiry, ",
            "created_at, updated_at, deleted_at ",
            "FROM accounts WHERE deleted_at IS NULL AND ",
            $filter
        )
    };
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    password_hash: Option<String>,
    roles: Vec<String>,
    provider: String,
    external_id: Option<String>,
    email_verified: bool,
    verification_token: Option<String>,
    verification_token_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountStoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|name| Role::parse(name.as_str()))
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(unexpected)?;
        let external_id = row
            .external_id
            .as_deref()
            .map(ExternalId::parse)
            .transpose()
            .map_err(unexpected)?;

        Account::restore(AccountRecord {
            id: AccountId::from(row.id),
            email: Email::parse(&row.email).map_err(unexpected)?,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            password_hash: row.password_hash.map(|h| PasswordHash::new(Secret::new(h))),
            roles,
            provider: row.provider.parse::<AuthProvider>().map_err(unexpected)?,
            external_id,
            email_verified: row.email_verified,
            verification_token: row.verification_token.map(VerificationToken::from),
            verification_token_expiry: row.verification_token_expiry,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
        .map_err(unexpected)
    }
}

#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl std::fmt::Display) -> AccountStoreError {
    AccountStoreError::UnexpectedError(e.to_string())
}

fn map_write_error(e: sqlx::Error) -> AccountStoreError {
    if let Some(db_err) = e.as_database_error() {
        match db_err.constraint() {
            Some(EMAIL_CONSTRAINT) => return AccountStoreError::EmailTaken,
            Some(EXTERNAL_ID_CONSTRAINT) => return AccountStoreError::ExternalIdTaken,
            _ => {}
        }
    }
    AccountStoreError::UnexpectedError(e.to_string())
}

fn into_account(row: Option<AccountRow>) -> Result<Option<Account>, AccountStoreError> {
    row.map(Account::try_from).transpose()
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[tracing::instrument(name = "Retrieving account by id from PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query_as::<_, AccountRow>(select_live_account!("id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        into_account(row)
    }

    #[tracing::instrument(name = "Retrieving account by email from PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query_as::<_, AccountRow>(select_live_account!("lower(email) = lower($1)"))
            .bind(email.as_ref().expose_secret())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        into_account(row)
    }

    #[tracing::instrument(name = "Retrieving account by external id from PostgreSQL", skip_all)]
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query_as::<_, AccountRow>(select_live_account!("external_id = $1"))
            .bind(external_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        into_account(row)
    }

    #[tracing::instrument(
        name = "Retrieving account by verification token from PostgreSQL",
        skip_all
    )]
    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query_as::<_, AccountRow>(select_live_account!("verification_token = $1"))
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountStoreError::UnexpectedError(e.to_string()))?;
        into_account(row)
    }

    #[tracing::instrument(
        name = "Upserting account in PostgreSQL",
        skip_all,
        fields(account_id = %account.id())
    )]
    async fn upsert(&self, account: &Account) -> Result<(), AccountStoreError> {
        let record = account.to_record();
        let roles: Vec<String> = record
            .roles
            .iter()
            .map(|role| role.as_str().to_owned())
            .collect();

        let _: PgQueryResult = sqlx::query(
            r#"
                INSERT INTO accounts (
                    id, email, display_name, avatar_url, password_hash, roles, provider,
                    external_id, email_verified, verification_token, verification_token_expiry,
                    created_at, updated_at, deleted_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                ON CONFLICT (id) DO UPDATE SET
                    email = EXCLUDED.email,
                    display_name = EXCLUDED.display_name,
                    avatar_url = EXCLUDED.avatar_url,
                    password_hash = EXCLUDED.password_hash,
                    roles = EXCLUDED.roles,
                    provider = EXCLUDED.provider,
                    external_id = EXCLUDED.external_id,
                    email_verified = EXCLUDED.email_verified,
                    verification_token = EXCLUDED.verification_token,
                    verification_token_expiry = EXCLUDED.verification_token_expiry,
                    updated_at = EXCLUDED.updated_at,
                    deleted_at = EXCLUDED.deleted_at
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.email.as_ref().expose_secret())
        .bind(&record.display_name)
        .bind(&record.avatar_url)
        .bind(
            record
                .password_hash
                .as_ref()
                .map(|h| h.as_ref().expose_secret().clone()),
        )
        .bind(&roles)
        .bind(record.provider.as_str())
        .bind(record.external_id.as_ref().map(ExternalId::as_str))
        .bind(record.email_verified)
        .bind(
            record
                .verification_token
                .as_ref()
                .map(VerificationToken::as_str),
        )
        .bind(record.verification_token_expiry)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }
}
