pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    account::{
        Account, AccountError, AccountId, AccountRecord, AuthProvider, PendingVerification, Role,
    },
    email::{Email, EmailError},
    external_identity::{ExternalId, ExternalIdentity, ExternalIdentityError},
    password::{MIN_PASSWORD_LENGTH, Password, PasswordError, PasswordHash},
    token::{
        IssuedToken, RevokeOutcome, RevokedTokenEntry, TokenClaims, TokenId, TokenIssueError,
        TokenRejection, VerifyMode,
    },
    verification_token::VerificationToken,
};

pub use ports::{
    repositories::{AccountStore, AccountStoreError, RevocationStore, RevocationStoreError},
    services::{Clock, CredentialError, CredentialVerifier, EmailClient, TokenCodec},
};
