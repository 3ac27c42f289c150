use color_eyre::eyre::Report;
use schoolgate_core::{
    AccountStoreError, CredentialError, EmailError, PasswordError, RevocationStoreError,
    TokenIssueError,
};
use thiserror::Error;

use crate::{
    identity_linker::LinkError,
    use_cases::{
        authenticate::AuthenticateError, external_sign_in::ExternalSignInError, logout::LogoutError,
        refresh::RefreshError, register::RegisterError,
    },
    verification_flow::{RedeemError, ResendError},
};

/// Caller-visible failure of an authentication operation.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User existed")]
    UserExisted,
    #[error("Invalid request: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    InvalidPassword(#[from] PasswordError),
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
    #[error("User not existed")]
    UserNotFound,
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,
    #[error("Google authentication failed")]
    ExternalAuthFailed,
    #[error(transparent)]
    Uncategorized(#[from] Report),
}

/// Stable classification of an [`AuthError`], carrying the code, status and message
/// shown to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Uncategorized,
    UserExisted,
    InvalidInput,
    InvalidPassword,
    InvalidEmail,
    UserNotFound,
    Unauthenticated,
    EmailNotVerified,
    InvalidVerificationToken,
    ExternalAuthFailed,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Uncategorized,
        ErrorKind::UserExisted,
        ErrorKind::InvalidInput,
        ErrorKind::InvalidPassword,
        ErrorKind::InvalidEmail,
        ErrorKind::UserNotFound,
        ErrorKind::Unauthenticated,
        ErrorKind::EmailNotVerified,
        ErrorKind::InvalidVerificationToken,
        ErrorKind::ExternalAuthFailed,
    ];

    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::Uncategorized => 9999,
            ErrorKind::UserExisted => 1002,
            ErrorKind::InvalidInput => 1001,
            ErrorKind::InvalidPassword => 1004,
            ErrorKind::InvalidEmail => 1009,
            ErrorKind::UserNotFound => 1005,
            ErrorKind::Unauthenticated => 1006,
            ErrorKind::EmailNotVerified => 1017,
            ErrorKind::InvalidVerificationToken => 1018,
            ErrorKind::ExternalAuthFailed => 1019,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::Uncategorized => 500,
            ErrorKind::UserExisted => 409,
            ErrorKind::InvalidInput
            | ErrorKind::InvalidPassword
            | ErrorKind::InvalidEmail
            | ErrorKind::InvalidVerificationToken => 400,
            ErrorKind::UserNotFound => 404,
            ErrorKind::Unauthenticated | ErrorKind::ExternalAuthFailed => 401,
            ErrorKind::EmailNotVerified => 403,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Uncategorized => "Uncategorized error",
            ErrorKind::UserExisted => "User existed",
            ErrorKind::InvalidInput => "Invalid request",
            ErrorKind::InvalidPassword => "Password must be at least 8 characters",
            ErrorKind::InvalidEmail => "Invalid email address",
            ErrorKind::UserNotFound => "User not existed",
            ErrorKind::Unauthenticated => "Unauthenticated",
            ErrorKind::EmailNotVerified => "Email not verified",
            ErrorKind::InvalidVerificationToken => "Invalid or expired verification token",
            ErrorKind::ExternalAuthFailed => "Google authentication failed",
        }
    }
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserExisted => ErrorKind::UserExisted,
            AuthError::InvalidInput(_) => ErrorKind::InvalidInput,
            AuthError::InvalidPassword(_) => ErrorKind::InvalidPassword,
            AuthError::InvalidEmail(_) => ErrorKind::InvalidEmail,
            AuthError::UserNotFound => ErrorKind::UserNotFound,
            AuthError::Unauthenticated => ErrorKind::Unauthenticated,
            AuthError::EmailNotVerified => ErrorKind::EmailNotVerified,
            AuthError::InvalidVerificationToken => ErrorKind::InvalidVerificationToken,
            AuthError::ExternalAuthFailed => ErrorKind::ExternalAuthFailed,
            AuthError::Uncategorized(_) => ErrorKind::Uncategorized,
        }
    }
}

fn uncategorized<E>(error: E, context: &'static str) -> AuthError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AuthError::Uncategorized(Report::new(error).wrap_err(context))
}

impl From<AccountStoreError> for AuthError {
    fn from(error: AccountStoreError) -> Self {
        match error {
            AccountStoreError::EmailTaken => AuthError::UserExisted,
            other => uncategorized(other, "Account store failure"),
        }
    }
}

impl From<RevocationStoreError> for AuthError {
    fn from(error: RevocationStoreError) -> Self {
        uncategorized(error, "Revocation store failure")
    }
}

impl From<CredentialError> for AuthError {
    fn from(error: CredentialError) -> Self {
        uncategorized(error, "Credential hashing failure")
    }
}

impl From<TokenIssueError> for AuthError {
    fn from(error: TokenIssueError) -> Self {
        uncategorized(error, "Token signing failure")
    }
}

impl From<AuthenticateError> for AuthError {
    fn from(error: AuthenticateError) -> Self {
        match error {
            AuthenticateError::UserNotFound => AuthError::UserNotFound,
            AuthenticateError::BadCredentials => AuthError::Unauthenticated,
            AuthenticateError::EmailNotVerified => AuthError::EmailNotVerified,
            AuthenticateError::AccountStoreError(e) => e.into(),
            AuthenticateError::CredentialError(e) => e.into(),
            AuthenticateError::TokenIssueError(e) => e.into(),
        }
    }
}

impl From<RefreshError> for AuthError {
    fn from(error: RefreshError) -> Self {
        match error {
            RefreshError::Rejected(_) | RefreshError::Revoked | RefreshError::UnknownSubject => {
                AuthError::Unauthenticated
            }
            RefreshError::RevocationStoreError(e) => e.into(),
            RefreshError::AccountStoreError(e) => uncategorized(e, "Account store failure"),
            RefreshError::TokenIssueError(e) => e.into(),
        }
    }
}

impl From<LogoutError> for AuthError {
    fn from(error: LogoutError) -> Self {
        match error {
            LogoutError::RevocationStoreError(e) => e.into(),
        }
    }
}

impl From<LinkError> for AuthError {
    fn from(error: LinkError) -> Self {
        match error {
            LinkError::InvalidIdentity(_) => AuthError::ExternalAuthFailed,
            LinkError::AccountStoreError(e) => uncategorized(e, "Account store failure"),
            LinkError::CredentialError(e) => e.into(),
        }
    }
}

impl From<ExternalSignInError> for AuthError {
    fn from(error: ExternalSignInError) -> Self {
        match error {
            ExternalSignInError::LinkError(e) => e.into(),
            ExternalSignInError::TokenIssueError(e) => e.into(),
        }
    }
}

impl From<RegisterError> for AuthError {
    fn from(error: RegisterError) -> Self {
        match error {
            RegisterError::UserExisted => AuthError::UserExisted,
            RegisterError::PasswordError(e) => e.into(),
            RegisterError::AccountStoreError(e) => e.into(),
            RegisterError::CredentialError(e) => e.into(),
        }
    }
}

impl From<RedeemError> for AuthError {
    fn from(error: RedeemError) -> Self {
        match error {
            RedeemError::NotFound | RedeemError::Expired => AuthError::InvalidVerificationToken,
            RedeemError::AccountStoreError(e) => uncategorized(e, "Account store failure"),
        }
    }
}

impl From<ResendError> for AuthError {
    fn from(error: ResendError) -> Self {
        match error {
            ResendError::UserNotFound => AuthError::UserNotFound,
            ResendError::AccountStoreError(e) => uncategorized(e, "Account store failure"),
        }
    }
}
