use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    email::Email, external_identity::ExternalId, password::PasswordHash,
    verification_token::VerificationToken,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid account id: {0}")]
    InvalidId(String),
    #[error("Unknown auth provider: {0}")]
    UnknownProvider(String),
    #[error("Invalid role name: {0:?}")]
    InvalidRole(String),
    #[error("Local account {0} has no password hash")]
    LocalWithoutPassword(AccountId),
    #[error("Account {0} has a verification token without an expiry, or the reverse")]
    HalfSetVerification(AccountId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, AccountError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountError::InvalidId(raw.to_owned()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AccountId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthProvider {
    Local,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "LOCAL",
            AuthProvider::Google => "GOOGLE",
        }
    }
}

impl FromStr for AuthProvider {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(AuthProvider::Local),
            "GOOGLE" => Ok(AuthProvider::Google),
            other => Err(AccountError::UnknownProvider(other.to_owned())),
        }
    }
}

/// Flat role name. Authorization is a string-set match on the token scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Role(String);

impl Role {
    pub const USER: &'static str = "USER";
    pub const TEACHER: &'static str = "TEACHER";
    pub const ADMIN: &'static str = "ADMIN";

    pub fn parse(name: &str) -> Result<Self, AccountError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(AccountError::InvalidRole(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    /// Role granted to every newly created account.
    pub fn default_role() -> Self {
        Self(Self::USER.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outstanding email-verification challenge. Token and expiry only exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub token: VerificationToken,
    pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Flat persisted shape of an account, used by store adapters to rebuild an
/// [`Account`] through [`Account::restore`].
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: Email,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub roles: BTreeSet<Role>,
    pub provider: AuthProvider,
    pub external_id: Option<ExternalId>,
    pub email_verified: bool,
    pub verification_token: Option<VerificationToken>,
    pub verification_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    email: Email,
    display_name: Option<String>,
    avatar_url: Option<String>,
    password_hash: Option<PasswordHash>,
    roles: BTreeSet<Role>,
    provider: AuthProvider,
    external_id: Option<ExternalId>,
    email_verified: bool,
    pending_verification: Option<PendingVerification>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A password account created by sign-up. It starts unverified.
    pub fn new_local(
        email: Email,
        password_hash: PasswordHash,
        display_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            email,
            display_name,
            avatar_url: None,
            password_hash: Some(password_hash),
            roles: BTreeSet::from([Role::default_role()]),
            provider: AuthProvider::Local,
            external_id: None,
            email_verified: false,
            pending_verification: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// An account created on first external sign-in. The provider already verified
    /// the address; `unusable_hash` is the hash of a random secret nobody knows.
    pub fn new_external(
        external_id: ExternalId,
        email: Email,
        display_name: Option<String>,
        avatar_url: Option<String>,
        unusable_hash: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        let display_name = display_name.or_else(|| Some(email.local_part().to_owned()));
        Self {
            id: AccountId::new(),
            email,
            display_name,
            avatar_url,
            password_hash: Some(unusable_hash),
            roles: BTreeSet::from([Role::default_role()]),
            provider: AuthProvider::Google,
            external_id: Some(external_id),
            email_verified: true,
            pending_verification: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn restore(record: AccountRecord) -> Result<Self, AccountError> {
        if record.provider == AuthProvider::Local && record.password_hash.is_none() {
            return Err(AccountError::LocalWithoutPassword(record.id));
        }

        let pending_verification = match (
            record.verification_token,
            record.verification_token_expiry,
        ) {
            (Some(token), Some(expires_at)) => Some(PendingVerification { token, expires_at }),
            (None, None) => None,
            _ => return Err(AccountError::HalfSetVerification(record.id)),
        };

        Ok(Self {
            id: record.id,
            email: record.email,
            display_name: record.display_name,
            avatar_url: record.avatar_url,
            password_hash: record.password_hash,
            roles: record.roles,
            provider: record.provider,
            external_id: record.external_id,
            email_verified: record.email_verified,
            pending_verification,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        })
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn password_hash(&self) -> Option<&PasswordHash> {
        self.password_hash.as_ref()
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn provider(&self) -> AuthProvider {
        self.provider
    }

    pub fn external_id(&self) -> Option<&ExternalId> {
        self.external_id.as_ref()
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn pending_verification(&self) -> Option<&PendingVerification> {
        self.pending_verification.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Space-joined `ROLE_`-prefixed role names, in role-name order.
    pub fn scope(&self) -> String {
        self.roles
            .iter()
            .map(|role| format!("ROLE_{}", role.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn grant_role(&mut self, role: Role, now: DateTime<Utc>) {
        if self.roles.insert(role) {
            self.updated_at = now;
        }
    }

    /// Attach an external identity to this account. Irreversible: the account becomes
    /// a Google account and any local password stays on record but dormant.
    pub fn link_external(&mut self, external_id: ExternalId, now: DateTime<Utc>) {
        self.external_id = Some(external_id);
        self.provider = AuthProvider::Google;
        self.email_verified = true;
        self.updated_at = now;
    }

    /// Fill profile fields that are still empty. Returns whether anything changed.
    pub fn fill_missing_profile(
        &mut self,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut updated = false;

        if self.display_name.is_none() {
            if let Some(name) = display_name {
                self.display_name = Some(name.to_owned());
                updated = true;
            }
        }

        if self.avatar_url.is_none() {
            if let Some(url) = avatar_url {
                self.avatar_url = Some(url.to_owned());
                updated = true;
            }
        }

        if updated {
            self.updated_at = now;
        }
        updated
    }

    /// Replace any outstanding verification challenge with a new one.
    pub fn start_verification(
        &mut self,
        token: VerificationToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) {
        self.pending_verification = Some(PendingVerification { token, expires_at });
        self.updated_at = now;
    }

    pub fn complete_verification(&mut self, now: DateTime<Utc>) {
        self.email_verified = true;
        self.pending_verification = None;
        self.updated_at = now;
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Flatten into the persisted shape.
    pub fn to_record(&self) -> AccountRecord {
        let (verification_token, verification_token_expiry) = match &self.pending_verification
        {
            Some(pending) => (Some(pending.token.clone()), Some(pending.expires_at)),
            None => (None, None),
        };

        AccountRecord {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            password_hash: self.password_hash.clone(),
            roles: self.roles.clone(),
            provider: self.provider,
            external_id: self.external_id.clone(),
            email_verified: self.email_verified,
            verification_token,
            verification_token_expiry,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use quickcheck_macros::quickcheck;
    use secrecy::Secret;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
    }

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn hash() -> PasswordHash {
        PasswordHash::new(Secret::new("$2b$10$hash".to_owned()))
    }

    #[test]
    fn local_account_starts_unverified_with_default_role() {
        let account = Account::new_local(email("pupil@school.edu"), hash(), None, now());
        assert_eq!(account.provider(), AuthProvider::Local);
        assert!(!account.email_verified());
        assert!(account.password_hash().is_some());
        assert_eq!(account.scope(), "ROLE_USER");
    }

    #[test]
    fn external_account_defaults_display_name_to_local_part() {
        let account = Account::new_external(
            ExternalId::parse("g-1").unwrap(),
            email("ada@school.edu"),
            None,
            None,
            hash(),
            now(),
        );
        assert_eq!(account.display_name(), Some("ada"));
        assert!(account.email_verified());
        assert_eq!(account.provider(), AuthProvider::Google);
    }

    #[test]
    fn scope_is_ordered_by_role_name() {
        let mut account = Account::new_local(email("t@school.edu"), hash(), None, now());
        account.grant_role(Role::parse(Role::TEACHER).unwrap(), now());
        account.grant_role(Role::parse(Role::ADMIN).unwrap(), now());
        assert_eq!(account.scope(), "ROLE_ADMIN ROLE_TEACHER ROLE_USER");
    }

    #[quickcheck]
    fn scope_has_one_prefixed_entry_per_role(names: Vec<u8>) -> bool {
        let mut account = Account::new_local(email("q@school.edu"), hash(), None, now());
        for n in &names {
            account.grant_role(Role::parse(&format!("R{n}")).unwrap(), now());
        }
        let scope = account.scope();
        let entries: Vec<&str> = scope.split(' ').collect();
        entries.len() == account.roles().len() && entries.iter().all(|e| e.starts_with("ROLE_"))
    }

    #[test]
    fn fill_missing_profile_never_overwrites() {
        let mut account =
            Account::new_local(email("p@school.edu"), hash(), Some("Pat".into()), now());
        let changed = account.fill_missing_profile(Some("Other"), Some("http://a/p.png"), now());
        assert!(changed);
        assert_eq!(account.display_name(), Some("Pat"));
        assert_eq!(account.avatar_url(), Some("http://a/p.png"));

        let changed_again = account.fill_missing_profile(Some("X"), Some("http://b"), now());
        assert!(!changed_again);
        assert_eq!(account.avatar_url(), Some("http://a/p.png"));
    }

    #[test]
    fn link_external_forces_google_and_verified() {
        let mut account = Account::new_local(email("l@school.edu"), hash(), None, now());
        let id = *account.id();
        account.link_external(ExternalId::parse("g-77").unwrap(), now());
        assert_eq!(*account.id(), id);
        assert_eq!(account.provider(), AuthProvider::Google);
        assert!(account.email_verified());
        assert!(account.password_hash().is_some());
    }

    #[test]
    fn completing_verification_clears_the_challenge() {
        let mut account = Account::new_local(email("v@school.edu"), hash(), None, now());
        account.start_verification(
            VerificationToken::generate(),
            now() + Duration::hours(24),
            now(),
        );
        assert!(account.pending_verification().is_some());
        account.complete_verification(now());
        assert!(account.pending_verification().is_none());
        assert!(account.email_verified());
    }

    #[test]
    fn restore_round_trips_through_record() {
        let mut account = Account::new_local(email("r@school.edu"), hash(), None, now());
        account.start_verification(VerificationToken::generate(), now(), now());
        let restored = Account::restore(account.to_record()).unwrap();
        assert_eq!(restored.id(), account.id());
        assert_eq!(
            restored.pending_verification(),
            account.pending_verification()
        );
    }

    #[test]
    fn restore_rejects_local_account_without_password() {
        let mut record = Account::new_local(email("x@school.edu"), hash(), None, now()).to_record();
        record.password_hash = None;
        assert!(matches!(
            Account::restore(record),
            Err(AccountError::LocalWithoutPassword(_))
        ));
    }

    #[test]
    fn restore_rejects_half_set_verification() {
        let mut record = Account::new_local(email("y@school.edu"), hash(), None, now()).to_record();
        record.verification_token = Some(VerificationToken::generate());
        assert!(matches!(
            Account::restore(record),
            Err(AccountError::HalfSetVerification(_))
        ));
    }

    #[test]
    fn pending_verification_expires_at_the_boundary() {
        let pending = PendingVerification {
            token: VerificationToken::generate(),
            expires_at: now(),
        };
        assert!(!pending.is_expired(now() - Duration::seconds(1)));
        assert!(pending.is_expired(now()));
    }
}
