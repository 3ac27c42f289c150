use chrono::{DateTime, Duration, Utc};
use schoolgate_core::{Account, AccountStore, AccountStoreError, Email, VerificationToken};
use thiserror::Error;

pub const DEFAULT_VERIFICATION_TTL_HOURS: i64 = 24;

/// How long an emailed verification token stays redeemable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    ttl: Duration,
}

impl VerificationPolicy {
    pub fn from_hours(hours: i64) -> Self {
        Self {
            ttl: Duration::hours(hours),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn lifetime_hours(&self) -> i64 {
        self.ttl.num_hours()
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::from_hours(DEFAULT_VERIFICATION_TTL_HOURS)
    }
}

#[derive(Debug, Error)]
pub enum RedeemError {
    #[error("Verification token not found")]
    NotFound,
    #[error("Verification token expired")]
    Expired,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
}

#[derive(Debug, Error)]
pub enum ResendError {
    #[error("User not found")]
    UserNotFound,
    #[error("Account store error: {0}")]
    AccountStoreError(#[from] AccountStoreError),
}

#[derive(Debug)]
pub enum ResendOutcome {
    Issued {
        account: Account,
        token: VerificationToken,
    },
    AlreadyVerified,
}

/// Email-verification state machine: unverified with a pending token, then verified
/// with no token.
#[derive(Clone)]
pub struct VerificationFlow<A>
where
    A: AccountStore,
{
    accounts: A,
    policy: VerificationPolicy,
}

impl<A> VerificationFlow<A>
where
    A: AccountStore,
{
    pub fn new(accounts: A, policy: VerificationPolicy) -> Self {
        Self { accounts, policy }
    }

    pub fn policy(&self) -> VerificationPolicy {
        self.policy
    }

    /// Attach a fresh token to `account`, replacing any previous one, and persist it.
    #[tracing::instrument(
        name = "VerificationFlow::issue",
        skip_all,
        fields(account_id = %account.id())
    )]
    pub async fn issue(
        &self,
        account: &mut Account,
        now: DateTime<Utc>,
    ) -> Result<VerificationToken, AccountStoreError> {
        let token = VerificationToken::generate();
        account.start_verification(token.clone(), now + self.policy.ttl(), now);
        self.accounts.upsert(account).await?;
        Ok(token)
    }

    /// An expired token is left in place so the user can still request a new one.
    #[tracing::instrument(name = "VerificationFlow::redeem", skip_all)]
    pub async fn redeem(
        &self,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<Account, RedeemError> {
        let mut account = self
            .accounts
            .find_by_verification_token(token)
            .await?
            .ok_or(RedeemError::NotFound)?;

        let Some(pending) = account.pending_verification() else {
            return Err(RedeemError::NotFound);
        };
        if pending.is_expired(now) {
            return Err(RedeemError::Expired);
        }

        account.complete_verification(now);
        self.accounts.upsert(&account).await?;
        tracing::info!(account_id = %account.id(), "Email verified");

        Ok(account)
    }

    #[tracing::instrument(name = "VerificationFlow::resend", skip_all)]
    pub async fn resend(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<ResendOutcome, ResendError> {
        let mut account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ResendError::UserNotFound)?;

        if account.email_verified() {
            tracing::info!(account_id = %account.id(), "Email already verified, nothing to resend");
            return Ok(ResendOutcome::AlreadyVerified);
        }

        let token = self.issue(&mut account, now).await?;
        Ok(ResendOutcome::Issued { account, token })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use schoolgate_core::PasswordHash;
    use secrecy::Secret;

    use super::*;
    use crate::fakes::FakeAccountStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 7, 0, 0).unwrap()
    }

    async fn unverified(store: &FakeAccountStore) -> Account {
        let account = Account::new_local(
            Email::parse("new@school.edu").unwrap(),
            PasswordHash::new(Secret::new("hashed:password1".to_owned())),
            None,
            t0(),
        );
        store.upsert(&account).await.unwrap();
        account
    }

    #[tokio::test]
    async fn issued_token_redeems_once() {
        let store = FakeAccountStore::default();
        let flow = VerificationFlow::new(store.clone(), VerificationPolicy::default());
        let mut account = unverified(&store).await;

        let token = flow.issue(&mut account, t0()).await.unwrap();
        let later = t0() + Duration::hours(1);
        let verified = flow.redeem(&token, later).await.unwrap();
        assert!(verified.email_verified());
        assert!(verified.pending_verification().is_none());

        let again = flow.redeem(&token, t0() + Duration::hours(2)).await;
        assert!(matches!(again, Err(RedeemError::NotFound)));
    }

    #[test]
    fn default_policy_lasts_a_day() {
        let policy = VerificationPolicy::default();
        assert_eq!(policy.ttl(), Duration::hours(24));
        assert_eq!(policy.lifetime_hours(), 24);
    }

    #[tokio::test]
    async fn token_expires_after_the_policy_lifetime() {
        let store = FakeAccountStore::default();
        let flow = VerificationFlow::new(store.clone(), VerificationPolicy::default());
        let mut account = unverified(&store).await;
        let token = flow.issue(&mut account, t0()).await.unwrap();

        let result = flow.redeem(&token, t0() + Duration::hours(25)).await;
        assert!(matches!(result, Err(RedeemError::Expired)));

        let stored = store.find_by_id(account.id()).await.unwrap().unwrap();
        assert!(!stored.email_verified());
        assert!(stored.pending_verification().is_some());
    }

    #[tokio::test]
    async fn expiry_boundary_is_exclusive() {
        let store = FakeAccountStore::default();
        let flow = VerificationFlow::new(store.clone(), VerificationPolicy::from_hours(1));
        let mut account = unverified(&store).await;
        let token = flow.issue(&mut account, t0()).await.unwrap();

        let at_boundary = flow.redeem(&token, t0() + Duration::hours(1)).await;
        assert!(matches!(at_boundary, Err(RedeemError::Expired)));

        let just_before = flow
            .redeem(&token, t0() + Duration::hours(1) - Duration::seconds(1))
            .await;
        assert!(just_before.is_ok());
    }

    #[tokio::test]
    async fn resend_replaces_the_pending_token() {
        let store = FakeAccountStore::default();
        let flow = VerificationFlow::new(store.clone(), VerificationPolicy::default());
        let mut account = unverified(&store).await;
        let first = flow.issue(&mut account, t0()).await.unwrap();

        let outcome = flow.resend(account.email(), t0()).await.unwrap();
        let ResendOutcome::Issued { token: second, .. } = outcome else {
            panic!("expected a new token");
        };
        assert_ne!(first, second);
        assert!(matches!(flow.redeem(&first, t0()).await, Err(RedeemError::NotFound)));
        assert!(flow.redeem(&second, t0()).await.is_ok());
    }

    #[tokio::test]
    async fn resend_is_a_no_op_for_verified_accounts() {
        let store = FakeAccountStore::default();
        let flow = VerificationFlow::new(store.clone(), VerificationPolicy::default());
        let mut account = unverified(&store).await;
        account.complete_verification(t0());
        store.upsert(&account).await.unwrap();

        let outcome = flow.resend(account.email(), t0()).await.unwrap();
        assert!(matches!(outcome, ResendOutcome::AlreadyVerified));
        let stored = store.find_by_id(account.id()).await.unwrap().unwrap();
        assert!(stored.pending_verification().is_none());
    }

    #[tokio::test]
    async fn resend_for_unknown_email_fails() {
        let flow =
            VerificationFlow::new(FakeAccountStore::default(), VerificationPolicy::default());
        let email = Email::parse("ghost@school.edu").unwrap();
        assert!(matches!(
            flow.resend(&email, t0()).await,
            Err(ResendError::UserNotFound)
        ));
    }
}
