use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use schoolgate_core::{Email, EmailError};
use secrecy::Secret;
use serde::Deserialize;

use super::constants::{self, env, prod};
use crate::{persistence::RevocationBackendKind, token::JwtConfig};

/// Service settings, layered from `config/base.json`, `config/{APP_ENVIRONMENT}.json`
/// and `APP_`-prefixed environment variables (`__` separates nested keys).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceSetting {
    pub application: ApplicationSetting,
    pub auth: AuthSetting,
    pub postgres: PostgresSetting,
    pub redis: RedisSetting,
    pub email_client: EmailClientSetting,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSetting {
    pub address: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSetting {
    pub jwt: JwtSetting,
    pub allowed_origins: AllowedOrigins,
    pub revocation_backend: RevocationBackendKind,
    pub purge_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSetting {
    pub signer_key: Secret<String>,
    pub issuer: String,
    /// Seconds an access token is valid for.
    pub valid_duration: i64,
    /// Seconds after issue during which a token may be refreshed.
    pub refreshable_duration: i64,
}

impl JwtSetting {
    pub fn to_jwt_config(&self) -> JwtConfig {
        JwtConfig {
            signer_key: self.signer_key.clone(),
            issuer: self.issuer.clone(),
            valid_duration_secs: self.valid_duration,
            refreshable_duration_secs: self.refreshable_duration,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSetting {
    pub url: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSetting {
    pub host_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailClientSetting {
    pub base_url: String,
    pub sender: String,
    /// Postmark server token. Without one the service logs emails instead of sending.
    #[serde(default)]
    pub auth_token: Option<Secret<String>>,
    pub timeout_in_millis: u64,
}

impl EmailClientSetting {
    pub fn sender(&self) -> Result<Email, EmailError> {
        Email::parse(&self.sender)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_millis)
    }
}

/// Origins allowed by CORS. Accepts a JSON list or a comma-separated string, the
/// latter being what an environment variable can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "OriginList")]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn contains(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OriginList {
    Joined(String),
    List(Vec<String>),
}

impl From<OriginList> for AllowedOrigins {
    fn from(value: OriginList) -> Self {
        let raw = match value {
            OriginList::Joined(joined) => joined.split(',').map(str::to_owned).collect(),
            OriginList::List(list) => list,
        };
        Self(
            raw.into_iter()
                .map(|origin| origin.trim().to_owned())
                .filter(|origin| !origin.is_empty())
                .collect(),
        )
    }
}

impl AuthServiceSetting {
    /// Load settings from the working directory's `config/` folder and the environment.
    /// A `.env` file, if present, is read first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(constants::CONFIG_DIR))
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let environment = std::env::var(env::APP_ENVIRONMENT_ENV_VAR)
            .unwrap_or_else(|_| constants::DEFAULT_ENVIRONMENT.to_owned());

        let base = config_dir.join(constants::BASE_CONFIG_FILE);
        let environment_file = config_dir.join(format!("{environment}.json"));

        let builder = Config::builder()
            .add_source(File::new(&base.to_string_lossy(), FileFormat::Json).required(false))
            .add_source(
                File::new(&environment_file.to_string_lossy(), FileFormat::Json).required(false),
            )
            .add_source(
                Environment::with_prefix(env::SETTINGS_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(env::SETTINGS_ENV_SEPARATOR)
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("application.address", prod::APP_ADDRESS)?
            .set_default("application.public_base_url", prod::PUBLIC_BASE_URL)?
            .set_default("auth.jwt.issuer", prod::JWT_ISSUER)?
            .set_default("auth.jwt.valid_duration", prod::JWT_VALID_DURATION_SECS)?
            .set_default(
                "auth.jwt.refreshable_duration",
                prod::JWT_REFRESHABLE_DURATION_SECS,
            )?
            .set_default("auth.allowed_origins", "")?
            .set_default("auth.revocation_backend", "redis")?
            .set_default("auth.purge_interval_secs", prod::PURGE_INTERVAL_SECS as i64)?
            .set_default("redis.host_name", prod::REDIS_HOST_NAME)?
            .set_default("email_client.base_url", prod::email_client::BASE_URL)?
            .set_default(
                "email_client.timeout_in_millis",
                prod::email_client::TIMEOUT_IN_MILLIS as i64,
            )?
            .build()?
            .try_deserialize()
    }
}
