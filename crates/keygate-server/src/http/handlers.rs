//! Login, refresh, logout and principal endpoints

use super::cookies::{clear_refresh_cookie, read_cookie, refresh_cookie};
use super::envelope::Envelope;
use super::error::ApiError;
use super::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keygate_core::AuthenticatedPrincipal;
use keygate_session::{Challenge, TokenBundle};
use serde::{Deserialize, Serialize};

/// `POST /auth/challenge` body
#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    #[serde(default)]
    address: Option<String>,
}

/// `POST /auth/verify` body
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    signature: Option<String>,
}

/// Session returned to the client; the refresh token travels as a cookie
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    address: String,
    token: String,
    expires_at: u64,
    refresh_expires_at: u64,
}

#[derive(Debug, Serialize)]
struct LogoutResponse {
    logout: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn session_response(state: &AppState, bundle: TokenBundle) -> Response {
    let max_age = bundle
        .refresh_expires_at
        .saturating_sub(state.clock.now_ms());
    let cookie = refresh_cookie(&state.cookie, &bundle.refresh_token, max_age);
    let body = SessionResponse {
        address: bundle.address,
        token: bundle.access_token,
        expires_at: bundle.access_expires_at,
        refresh_expires_at: bundle.refresh_expires_at,
    };
    ([(SET_COOKIE, cookie)], Json(Envelope::ok(body))).into_response()
}

/// Issue a login challenge
pub async fn challenge(
    State(state): State<AppState>,
    body: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<Json<Envelope<Challenge>>, ApiError> {
    let address = body
        .ok()
        .and_then(|Json(req)| non_empty(req.address))
        .ok_or_else(|| ApiError::BadRequest("Missing address".to_string()))?;

    Ok(Json(Envelope::ok(state.sessions.issue_challenge(&address))))
}

/// Verify a signed challenge and open a session
pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let missing = || ApiError::BadRequest("Missing address or signature".to_string());
    let Json(req) = body.map_err(|_| missing())?;
    let (Some(address), Some(signature)) = (non_empty(req.address), non_empty(req.signature))
    else {
        return Err(missing());
    };

    let bundle = state.sessions.verify_and_issue(&address, &signature)?;
    Ok(session_response(&state, bundle))
}

/// Rotate the refresh cookie into a new session
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let token = read_cookie(&headers, &state.cookie.name).ok_or(ApiError::MissingRefreshToken)?;

    match state.sessions.rotate_refresh(&token) {
        Some(bundle) => Ok(session_response(&state, bundle)),
        None => Ok((
            StatusCode::UNAUTHORIZED,
            [(SET_COOKIE, clear_refresh_cookie(&state.cookie))],
            Json(Envelope::fail(401, "Invalid refresh token")),
        )
            .into_response()),
    }
}

/// Revoke the refresh cookie, if any, and clear it
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = read_cookie(&headers, &state.cookie.name) {
        state.sessions.revoke(&token);
    }
    (
        [(SET_COOKIE, clear_refresh_cookie(&state.cookie))],
        Json(Envelope::ok(LogoutResponse { logout: true })),
    )
        .into_response()
}

/// Principal attached by the bearer middleware
pub async fn me(
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Json<Envelope<AuthenticatedPrincipal>> {
    Json(Envelope::ok(principal))
}
