pub mod authenticator;
pub mod coordinator;
pub mod error;
pub mod identity_linker;
pub mod notifications;
pub mod use_cases;
pub mod verification_flow;

#[cfg(test)]
pub(crate) mod fakes;

pub use authenticator::{
    AuthenticationResponse, Authenticator, IntrospectResponse, RegisteredAccount, Registration,
};
pub use coordinator::AuthenticationCoordinator;
pub use error::{AuthError, ErrorKind};
pub use identity_linker::{IdentityLinker, LinkError};
pub use notifications::Notifier;
pub use use_cases::*;
pub use verification_flow::{
    DEFAULT_VERIFICATION_TTL_HOURS, RedeemError, ResendError, ResendOutcome, VerificationFlow,
    VerificationPolicy,
};
