//! Bearer authentication for protected routes

use super::error::ApiError;
use super::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use keygate_ucan::BearerCredential;

/// Resolve the caller and attach an `AuthenticatedPrincipal` to the request
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerCredential::from_authorization)
        .ok_or(ApiError::MissingCredential)?;

    let principal = state.authenticator.authenticate(credential)?;
    tracing::debug!(address = %principal.address, method = %principal.method, "Request authenticated");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
