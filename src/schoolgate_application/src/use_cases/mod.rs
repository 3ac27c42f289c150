pub mod authenticate;
pub mod external_sign_in;
pub mod introspect;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod verify_email;

pub use authenticate::{AuthenticateError, AuthenticateUseCase};
pub use external_sign_in::{ExternalSignInError, ExternalSignInUseCase};
pub use introspect::IntrospectUseCase;
pub use logout::{LogoutError, LogoutOutcome, LogoutUseCase};
pub use refresh::{RefreshError, RefreshUseCase};
pub use register::{RegisterError, RegisterUseCase};
pub use verify_email::{ResendVerificationUseCase, VerifyEmailUseCase};
