pub mod clock;
pub mod config;
pub mod credentials;
pub mod email;
pub mod persistence;
pub mod token;

// Re-export commonly used types for convenience
pub use clock::SystemClock;
pub use config::{AllowedOrigins, AuthServiceSetting};
pub use credentials::BcryptCredentialVerifier;
pub use email::{MockEmailClient, PostmarkEmailClient};
pub use persistence::{
    HashMapAccountStore, HashMapRevocationStore, PostgresAccountStore, PostgresRevocationStore,
    RedisRevocationStore, RevocationBackend, RevocationBackendKind,
};
pub use token::{JwtConfig, JwtTokenCodec};
