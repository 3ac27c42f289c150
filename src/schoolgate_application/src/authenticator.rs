use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schoolgate_core::{Account, ExternalIdentity, IssuedToken};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub token: String,
    pub expiry_time: DateTime<Utc>,
}

impl From<IssuedToken> for AuthenticationResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token.expose_secret().clone(),
            expiry_time: issued.expires_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectResponse {
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Secret<String>,
    pub password: Secret<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

impl From<&Account> for RegisteredAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            email: account.email().as_ref().expose_secret().clone(),
            display_name: account.display_name().map(str::to_owned),
            email_verified: account.email_verified(),
        }
    }
}

/// The public authentication operations. Transports depend on this trait only.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        email: Secret<String>,
        password: Secret<String>,
    ) -> Result<AuthenticationResponse, AuthError>;

    /// Never fails: anything short of a verified, unrevoked token is `valid = false`.
    async fn introspect(&self, token: Secret<String>) -> IntrospectResponse;

    async fn refresh(&self, token: Secret<String>) -> Result<AuthenticationResponse, AuthError>;

    /// Succeeds for tokens that do not verify, since there is nothing to revoke.
    async fn logout(&self, token: Secret<String>) -> Result<(), AuthError>;

    async fn verify_email(&self, token: Secret<String>) -> Result<(), AuthError>;

    async fn resend_verification(&self, email: Secret<String>) -> Result<(), AuthError>;

    async fn authenticate_with_external_identity(
        &self,
        identity: ExternalIdentity,
    ) -> Result<AuthenticationResponse, AuthError>;

    async fn register(&self, registration: Registration) -> Result<RegisteredAccount, AuthError>;
}
