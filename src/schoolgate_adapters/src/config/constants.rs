pub mod env {
    pub const APP_ENVIRONMENT_ENV_VAR: &str = "APP_ENVIRONMENT";
    pub const SETTINGS_ENV_PREFIX: &str = "APP";
    pub const SETTINGS_ENV_SEPARATOR: &str = "__";
}

pub const CONFIG_DIR: &str = "config";
pub const BASE_CONFIG_FILE: &str = "base.json";
pub const DEFAULT_ENVIRONMENT: &str = "local";

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub const PUBLIC_BASE_URL: &str = "http://localhost:3000";
    pub const JWT_ISSUER: &str = "school.edu";
    pub const JWT_VALID_DURATION_SECS: i64 = 3_600;
    pub const JWT_REFRESHABLE_DURATION_SECS: i64 = 36_000;
    pub const PURGE_INTERVAL_SECS: u64 = 3_600;
    pub const REDIS_HOST_NAME: &str = "127.0.0.1";

    pub mod email_client {
        pub const BASE_URL: &str = "https://api.postmarkapp.com/";
        pub const TIMEOUT_IN_MILLIS: u64 = 10_000;
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
    pub const JWT_SIGNER_KEY: &str = "test-signer-key-that-is-at-least-32-bytes-long";

    pub mod email_client {
        use std::time::Duration;

        pub const SENDER: &str = "test@email.com";
        pub const TIMEOUT: Duration = Duration::from_millis(200);
    }
}
