use chrono::{DateTime, Utc};
use schoolgate_core::{AccountStore, Email, EmailClient, VerificationToken};

use crate::{
    notifications::Notifier,
    verification_flow::{RedeemError, ResendError, ResendOutcome, VerificationFlow},
};

/// Verify email use case - redeems a mailed verification token
pub struct VerifyEmailUseCase<A>
where
    A: AccountStore,
{
    verification: VerificationFlow<A>,
}

impl<A> VerifyEmailUseCase<A>
where
    A: AccountStore,
{
    pub fn new(verification: VerificationFlow<A>) -> Self {
        Self { verification }
    }

    #[tracing::instrument(name = "VerifyEmailUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        token: VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<(), RedeemError> {
        self.verification.redeem(&token, now).await.map(|_| ())
    }
}

/// Resend verification use case - issues a replacement token unless already verified
pub struct ResendVerificationUseCase<A, E>
where
    A: AccountStore,
    E: EmailClient,
{
    verification: VerificationFlow<A>,
    notifier: Notifier<E>,
}

impl<A, E> ResendVerificationUseCase<A, E>
where
    A: AccountStore,
    E: EmailClient,
{
    pub fn new(verification: VerificationFlow<A>, notifier: Notifier<E>) -> Self {
        Self {
            verification,
            notifier,
        }
    }

    #[tracing::instrument(name = "ResendVerificationUseCase::execute", skip_all)]
    pub async fn execute(&self, email: Email, now: DateTime<Utc>) -> Result<(), ResendError> {
        match self.verification.resend(&email, now).await? {
            ResendOutcome::Issued { account, token } => {
                self.notifier
                    .send_verification(
                        &account,
                        &token,
                        self.verification.policy().lifetime_hours(),
                    )
                    .await;
                tracing::info!(account_id = %account.id(), "Verification email resent");
            }
            ResendOutcome::AlreadyVerified => {}
        }
        Ok(())
    }
}
