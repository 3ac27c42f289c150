//! In-memory stand-ins for every port, shared by the unit tests of this crate.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use schoolgate_core::{
    Account, AccountId, AccountStore, AccountStoreError, Clock, CredentialError, CredentialVerifier,
    Email, EmailClient, ExternalId, IssuedToken, Password, PasswordHash, RevocationStore,
    RevocationStoreError, RevokeOutcome, RevokedTokenEntry, TokenClaims, TokenCodec, TokenId,
    TokenIssueError, TokenRejection, VerificationToken, VerifyMode,
};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;

pub fn verified_account(email: &str) -> Account {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut account = Account::new_local(
        Email::parse(email).unwrap(),
        PasswordHash::new(Secret::new("hashed:password123".to_owned())),
        None,
        now,
    );
    account.complete_verification(now);
    account
}

#[derive(Clone, Default)]
pub struct FakeAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl FakeAccountStore {
    pub async fn len(&self) -> usize {
        self.accounts
            .read()
            .await
            .values()
            .filter(|a| !a.is_deleted())
            .count()
    }

    async fn find_live(&self, predicate: impl Fn(&Account) -> bool) -> Option<Account> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| !a.is_deleted() && predicate(a))
            .cloned()
    }
}

#[async_trait]
impl AccountStore for FakeAccountStore {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.find_live(|a| a.id() == id).await)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.find_live(|a| a.email() == email).await)
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Account>, AccountStoreError> {
        Ok(self
            .find_live(|a| a.external_id() == Some(external_id))
            .await)
    }

    async fn find_by_verification_token(
        &self,
        token: &VerificationToken,
    ) -> Result<Option<Account>, AccountStoreError> {
        Ok(self
            .find_live(|a| a.pending_verification().is_some_and(|p| &p.token == token))
            .await)
    }

    async fn upsert(&self, account: &Account) -> Result<(), AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        if !account.is_deleted() {
            for other in accounts.values() {
                if other.id() == account.id() || other.is_deleted() {
                    continue;
                }
                if other.email() == account.email() {
                    return Err(AccountStoreError::EmailTaken);
                }
                if account.external_id().is_some() && other.external_id() == account.external_id()
                {
                    return Err(AccountStoreError::ExternalIdTaken);
                }
            }
        }
        accounts.insert(*account.id(), account.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeRevocationStore {
    entries: Arc<RwLock<HashMap<TokenId, RevokedTokenEntry>>>,
    unavailable: bool,
}

impl FakeRevocationStore {
    /// A store whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub async fn entry(&self, token_id: &TokenId) -> Option<RevokedTokenEntry> {
        self.entries.read().await.get(token_id).cloned()
    }

    fn check(&self) -> Result<(), RevocationStoreError> {
        if self.unavailable {
            return Err(RevocationStoreError::DatabaseError("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for FakeRevocationStore {
    async fn is_revoked(&self, token_id: &TokenId) -> Result<bool, RevocationStoreError> {
        self.check()?;
        Ok(self.entries.read().await.contains_key(token_id))
    }

    async fn revoke(
        &self,
        entry: RevokedTokenEntry,
    ) -> Result<RevokeOutcome, RevocationStoreError> {
        self.check()?;
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.token_id) {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        entries.insert(entry.token_id.clone(), entry);
        Ok(RevokeOutcome::Revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        self.check()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}

/// Unsigned codec: the token is the JSON claim set behind a fixed prefix. Expiry rules
/// match the real codec.
#[derive(Clone)]
pub struct FakeTokenCodec {
    valid_secs: i64,
    refreshable_secs: i64,
}

const FAKE_PREFIX: &str = "fake.";

impl FakeTokenCodec {
    pub fn new(valid_secs: i64, refreshable_secs: i64) -> Self {
        Self {
            valid_secs,
            refreshable_secs,
        }
    }
}

impl TokenCodec for FakeTokenCodec {
    fn mint(&self, account: &Account, now: DateTime<Utc>) -> Result<IssuedToken, TokenIssueError> {
        let claims = TokenClaims {
            sub: account.id().to_string(),
            iss: "school.edu".into(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.valid_secs,
            jti: TokenId::generate(),
            scope: account.scope(),
            email: account.email().as_ref().expose_secret().clone(),
            email_verified: account.email_verified(),
            google_id: account.external_id().map(|id| id.as_str().to_owned()),
        };
        let body = serde_json::to_string(&claims)
            .map_err(|e| TokenIssueError::Signing(e.to_string()))?;
        Ok(IssuedToken {
            token: Secret::new(format!("{FAKE_PREFIX}{body}")),
            token_id: claims.jti,
            expires_at: now + Duration::seconds(self.valid_secs),
        })
    }

    fn verify(
        &self,
        token: &str,
        now: DateTime<Utc>,
        mode: VerifyMode,
    ) -> Result<TokenClaims, TokenRejection> {
        let body = token
            .strip_prefix(FAKE_PREFIX)
            .ok_or(TokenRejection::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_str(body).map_err(|_| TokenRejection::Malformed)?;
        let expiry = match mode {
            VerifyMode::Access => claims.exp,
            VerifyMode::Refresh => claims.iat + self.refreshable_secs,
        };
        if now.timestamp() >= expiry {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }

    fn refreshable_secs(&self) -> i64 {
        self.refreshable_secs
    }
}

/// "Hashes" by prefixing, so stored hashes are readable in assertions.
#[derive(Clone, Copy)]
pub struct FakeCredentialVerifier;

#[async_trait]
impl CredentialVerifier for FakeCredentialVerifier {
    async fn verify(
        &self,
        candidate: &Password,
        stored: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        let expected = format!("hashed:{}", candidate.as_ref().expose_secret());
        Ok(stored.as_ref().expose_secret() == &expected)
    }

    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError> {
        let hashed = format!("hashed:{}", password.as_ref().expose_secret());
        Ok(PasswordHash::new(Secret::new(hashed)))
    }
}

#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub content: String,
}

#[derive(Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<RwLock<Vec<SentEmail>>>,
    failing: bool,
}

impl RecordingEmailClient {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl EmailClient for RecordingEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        subject: &str,
        content: &str,
    ) -> Result<(), String> {
        if self.failing {
            return Err("mail relay unavailable".to_owned());
        }
        self.sent.write().await.push(SentEmail {
            recipient: recipient.as_ref().expose_secret().clone(),
            subject: subject.to_owned(),
            content: content.to_owned(),
        });
        Ok(())
    }
}
