//! # Schoolgate - school authentication service
//!
//! Facade crate that re-exports the public APIs of the workspace crates, so that a
//! host application can depend on `schoolgate` alone.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `Account`, `TokenClaims`, etc.
//! - **Ports**: `AccountStore`, `RevocationStore`, `TokenCodec`, `CredentialVerifier`
//! - **Application**: `AuthenticationCoordinator` behind the `Authenticator` trait
//! - **Adapters**: `JwtTokenCodec`, `BcryptCredentialVerifier`, PostgreSQL / Redis /
//!   in-memory stores, `PostmarkEmailClient`
//! - **Service**: `AuthService`, the axum router

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use schoolgate_core::*;
}

pub use schoolgate_core::{
    Account, AccountId, AuthProvider, Email, ExternalIdentity, Password, Role, TokenClaims, TokenId,
    VerificationToken,
};

// ============================================================================
// Ports
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use schoolgate_core::{
        AccountStore, AccountStoreError, RevocationStore, RevocationStoreError,
    };
}

pub use schoolgate_core::{
    AccountStore, Clock, CredentialVerifier, EmailClient, RevocationStore, TokenCodec,
};

// ============================================================================
// Application Layer
// ============================================================================

/// Use cases, the coordinator and the error taxonomy
pub mod application {
    pub use schoolgate_application::*;
}

pub use schoolgate_application::{
    AuthError, AuthenticationCoordinator, AuthenticationResponse, Authenticator, ErrorKind,
    IntrospectResponse, Notifier, RegisteredAccount, Registration, VerificationPolicy,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use schoolgate_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use schoolgate_adapters::email::*;
    }

    /// Token signing
    pub mod token {
        pub use schoolgate_adapters::token::*;
    }

    /// Configuration
    pub mod config {
        pub use schoolgate_adapters::config::*;
    }
}

pub use schoolgate_adapters::{
    AuthServiceSetting, BcryptCredentialVerifier, HashMapAccountStore, HashMapRevocationStore,
    JwtConfig, JwtTokenCodec, MockEmailClient, PostgresAccountStore, PostgresRevocationStore,
    PostmarkEmailClient, RedisRevocationStore, RevocationBackend, SystemClock,
};

// ============================================================================
// Auth Service (Main Entry Point)
// ============================================================================

pub use schoolgate_auth_service::{
    AuthService, assemble, helpers::configure_postgresql, helpers::configure_redis,
    spawn_revocation_purge,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
