//! Keygate Server
//!
//! Wires the session service and capability verifier behind an axum router.
//! [`Authenticator`] is usable without HTTP by any collaborator that needs to
//! turn a bearer value into an `AuthenticatedPrincipal`.

pub mod authenticator;
pub mod http;

pub use authenticator::Authenticator;
pub use http::{router, ApiError, AppState, Envelope};
