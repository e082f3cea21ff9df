//! Services layer for access-service.
//!
//! Holds the permission table, the backend collaborator, context
//! resolution and the route guards built on it.

mod backend;
pub mod context;
mod database;
pub mod error;
pub mod guard;
mod mock;
pub mod permissions;
mod session;

pub use backend::Backend;
pub use context::{resolve_context, AuthContext};
pub use database::PgBackend;
pub use error::{BackendError, SessionError};
pub use guard::{
    check_permission, require_authenticated, require_permission, require_protection_access,
    AuthorizationOutcome, Denial, DenialReason,
};
pub use mock::InMemoryBackend;
pub use session::{SessionClaims, SessionVerifier};
