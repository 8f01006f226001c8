//! HTTP surface
//!
//! Public routes drive the wallet login flow. Everything mounted behind
//! [`middleware::require_principal`] sees an `AuthenticatedPrincipal`
//! extension.

pub mod cookies;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use envelope::Envelope;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Router for the `/auth` endpoints
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/challenge", post(handlers::challenge))
        .route("/auth/verify", post(handlers::verify))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout));

    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_principal,
        ));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
