use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use schoolgate_adapters::{AuthServiceSetting, SystemClock};
use schoolgate_auth_service::{AuthService, assemble, spawn_revocation_purge, tracing::init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = AuthServiceSetting::load().wrap_err("Failed to load settings")?;
    let components = assemble(&settings).await?;

    let _housekeeping = spawn_revocation_purge(
        components.revocations,
        SystemClock,
        Duration::from_secs(settings.auth.purge_interval_secs),
    );

    let allowed_origins = Some(settings.auth.allowed_origins.clone())
        .filter(|origins| !origins.is_empty());

    let listener = tokio::net::TcpListener::bind(&settings.application.address).await?;
    tracing::info!("Starting schoolgate auth service...");

    AuthService::new(components.authenticator)
        .run_standalone(listener, allowed_origins)
        .await?;

    Ok(())
}
