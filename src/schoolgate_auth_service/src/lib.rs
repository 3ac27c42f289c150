pub mod auth_service;
pub mod error;
pub mod helpers;
pub mod housekeeping;
pub mod routes;
pub mod startup;
pub mod tracing;

pub use auth_service::AuthService;
pub use error::{ApiError, ErrorBody};
pub use housekeeping::{purge_revocations, spawn_revocation_purge};
pub use startup::{Components, assemble};
