use async_trait::async_trait;
use schoolgate_core::{
    AccountStore, Clock, CredentialVerifier, Email, EmailClient, ExternalIdentity, Password,
    RevocationStore, TokenCodec, VerificationToken,
};
use secrecy::{ExposeSecret, Secret};

use crate::{
    authenticator::{
        AuthenticationResponse, Authenticator, IntrospectResponse, RegisteredAccount, Registration,
    },
    error::AuthError,
    notifications::Notifier,
    use_cases::{
        AuthenticateUseCase, ExternalSignInUseCase, IntrospectUseCase, LogoutOutcome, LogoutUseCase,
        RefreshUseCase, RegisterUseCase, ResendVerificationUseCase, VerifyEmailUseCase,
    },
    verification_flow::{VerificationFlow, VerificationPolicy},
};

/// Wires the ports into the public operations and is the one place where component
/// failures become [`AuthError`]s.
///
/// Every port is held by value and cloned into the use case for each call; store
/// adapters share their state internally.
#[derive(Clone)]
pub struct AuthenticationCoordinator<A, R, T, V, E, K>
where
    A: AccountStore + Clone,
    R: RevocationStore + Clone,
    T: TokenCodec + Clone,
    V: CredentialVerifier + Clone,
    E: EmailClient + Clone,
    K: Clock,
{
    accounts: A,
    revocations: R,
    codec: T,
    credentials: V,
    notifier: Notifier<E>,
    clock: K,
    verification_policy: VerificationPolicy,
}

impl<A, R, T, V, E, K> AuthenticationCoordinator<A, R, T, V, E, K>
where
    A: AccountStore + Clone,
    R: RevocationStore + Clone,
    T: TokenCodec + Clone,
    V: CredentialVerifier + Clone,
    E: EmailClient + Clone,
    K: Clock,
{
    /// # Arguments
    /// * `clock` - Source of `now` for every operation
    /// * `verification_policy` - Lifetime of emailed verification tokens
    pub fn new(
        accounts: A,
        revocations: R,
        codec: T,
        credentials: V,
        notifier: Notifier<E>,
        clock: K,
        verification_policy: VerificationPolicy,
    ) -> Self {
        Self {
            accounts,
            revocations,
            codec,
            credentials,
            notifier,
            clock,
            verification_policy,
        }
    }

    fn verification_flow(&self) -> VerificationFlow<A> {
        VerificationFlow::new(self.accounts.clone(), self.verification_policy)
    }
}

/// Log uncategorized failures with their full report before they are returned.
fn reported(operation: &'static str, error: AuthError) -> AuthError {
    if let AuthError::Uncategorized(report) = &error {
        tracing::error!(operation, error = ?report, "Uncategorized failure");
    }
    error
}

#[async_trait]
impl<A, R, T, V, E, K> Authenticator for AuthenticationCoordinator<A, R, T, V, E, K>
where
    A: AccountStore + Clone + 'static,
    R: RevocationStore + Clone + 'static,
    T: TokenCodec + Clone + 'static,
    V: CredentialVerifier + Clone + 'static,
    E: EmailClient + Clone + 'static,
    K: Clock + 'static,
{
    async fn authenticate(
        &self,
        email: Secret<String>,
        password: Secret<String>,
    ) -> Result<AuthenticationResponse, AuthError> {
        let email = Email::try_from(email)?;
        let password = Password::try_from(password)?;

        let use_case = AuthenticateUseCase::new(
            self.accounts.clone(),
            self.credentials.clone(),
            self.codec.clone(),
            self.notifier.clone(),
        );
        let issued = use_case
            .execute(email, password, self.clock.now())
            .await
            .map_err(|e| reported("authenticate", e.into()))?;

        Ok(issued.into())
    }

    async fn introspect(&self, token: Secret<String>) -> IntrospectResponse {
        let use_case = IntrospectUseCase::new(self.revocations.clone(), self.codec.clone());
        match use_case.execute(&token, self.clock.now()).await {
            Ok(valid) => IntrospectResponse { valid },
            Err(e) => {
                tracing::error!(error = %e, "Revocation lookup failed during introspection");
                IntrospectResponse { valid: false }
            }
        }
    }

    async fn refresh(&self, token: Secret<String>) -> Result<AuthenticationResponse, AuthError> {
        let use_case = RefreshUseCase::new(
            self.accounts.clone(),
            self.revocations.clone(),
            self.codec.clone(),
        );
        let issued = use_case
            .execute(&token, self.clock.now())
            .await
            .map_err(|e| reported("refresh", e.into()))?;

        Ok(issued.into())
    }

    async fn logout(&self, token: Secret<String>) -> Result<(), AuthError> {
        let use_case = LogoutUseCase::new(self.revocations.clone(), self.codec.clone());
        let outcome = use_case
            .execute(&token, self.clock.now())
            .await
            .map_err(|e| reported("logout", e.into()))?;

        if outcome == LogoutOutcome::AlreadyRevoked {
            tracing::debug!("Logout of an already revoked token");
        }
        Ok(())
    }

    async fn verify_email(&self, token: Secret<String>) -> Result<(), AuthError> {
        let token = VerificationToken::from(token.expose_secret().clone());
        VerifyEmailUseCase::new(self.verification_flow())
            .execute(token, self.clock.now())
            .await
            .map_err(|e| reported("verify_email", e.into()))
    }

    async fn resend_verification(&self, email: Secret<String>) -> Result<(), AuthError> {
        let email = Email::try_from(email)?;
        ResendVerificationUseCase::new(self.verification_flow(), self.notifier.clone())
            .execute(email, self.clock.now())
            .await
            .map_err(|e| reported("resend_verification", e.into()))
    }

    async fn authenticate_with_external_identity(
        &self,
        identity: ExternalIdentity,
    ) -> Result<AuthenticationResponse, AuthError> {
        let use_case = ExternalSignInUseCase::new(
            self.accounts.clone(),
            self.credentials.clone(),
            self.codec.clone(),
        );
        let issued = use_case
            .execute(identity, self.clock.now())
            .await
            .map_err(|e| reported("authenticate_with_external_identity", e.into()))?;

        Ok(issued.into())
    }

    async fn register(&self, registration: Registration) -> Result<RegisteredAccount, AuthError> {
        let email = Email::try_from(registration.email)?;
        let password = Password::try_from(registration.password)?;

        let use_case = RegisterUseCase::new(
            self.accounts.clone(),
            self.credentials.clone(),
            self.verification_flow(),
            self.notifier.clone(),
        );
        let account = use_case
            .execute(email, password, registration.display_name, self.clock.now())
            .await
            .map_err(|e| reported("register", e.into()))?;

        Ok(RegisteredAccount::from(&account))
    }
}
