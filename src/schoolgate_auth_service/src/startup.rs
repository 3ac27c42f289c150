use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client as HttpClient;
use schoolgate_adapters::{
    AuthServiceSetting, BcryptCredentialVerifier, HashMapRevocationStore, JwtTokenCodec,
    MockEmailClient, PostgresAccountStore, PostgresRevocationStore, PostmarkEmailClient,
    RedisRevocationStore, RevocationBackend, RevocationBackendKind, SystemClock,
};
use schoolgate_application::{
    AuthenticationCoordinator, Authenticator, Notifier, VerificationPolicy,
};
use schoolgate_core::EmailClient;
use secrecy::ExposeSecret;

use crate::helpers::{configure_postgresql, configure_redis};

/// Everything the binary needs to serve: the operations and the deny-list the
/// housekeeping task sweeps.
pub struct Components {
    pub authenticator: Arc<dyn Authenticator>,
    pub revocations: RevocationBackend,
}

/// Connect the configured backends and wire them into a coordinator.
pub async fn assemble(settings: &AuthServiceSetting) -> Result<Components> {
    let pg_pool = configure_postgresql(settings.postgres.url.expose_secret()).await?;
    let accounts = PostgresAccountStore::new(pg_pool.clone());

    let revocations = match settings.auth.revocation_backend {
        RevocationBackendKind::Redis => {
            let conn = configure_redis(&settings.redis.host_name)?;
            RevocationBackend::Redis(RedisRevocationStore::new(conn, Arc::new(SystemClock)))
        }
        RevocationBackendKind::Postgres => {
            RevocationBackend::Postgres(PostgresRevocationStore::new(pg_pool))
        }
        RevocationBackendKind::Memory => {
            tracing::warn!("In-memory revocation store: revocations are lost on restart");
            RevocationBackend::Memory(HashMapRevocationStore::new())
        }
    };
    tracing::info!(backend = ?revocations.kind(), "Revocation store ready");

    let authenticator = match &settings.email_client.auth_token {
        Some(auth_token) => {
            let http_client = HttpClient::builder()
                .timeout(settings.email_client.timeout())
                .build()
                .wrap_err("Failed to build HTTP client")?;
            let email_client = PostmarkEmailClient::new(
                settings.email_client.base_url.clone(),
                settings
                    .email_client
                    .sender()
                    .wrap_err("Invalid email sender")?,
                auth_token.clone(),
                http_client,
            );
            coordinator(settings, accounts, revocations.clone(), email_client)
        }
        None => {
            tracing::warn!("No email client token configured, emails are only logged");
            let email_client = MockEmailClient::new();
            coordinator(settings, accounts, revocations.clone(), email_client)
        }
    };

    Ok(Components {
        authenticator,
        revocations,
    })
}

fn coordinator<E>(
    settings: &AuthServiceSetting,
    accounts: PostgresAccountStore,
    revocations: RevocationBackend,
    email_client: E,
) -> Arc<dyn Authenticator>
where
    E: EmailClient + Clone + 'static,
{
    Arc::new(AuthenticationCoordinator::new(
        accounts,
        revocations,
        JwtTokenCodec::new(&settings.auth.jwt.to_jwt_config()),
        BcryptCredentialVerifier::new(),
        Notifier::new(email_client, settings.application.public_base_url.clone()),
        SystemClock,
        VerificationPolicy::default(),
    ))
}
