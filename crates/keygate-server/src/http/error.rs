//! HTTP error mapping

use super::envelope::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keygate_core::AuthError;
use keygate_session::SessionError;

/// Failure returned by a handler or the bearer middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body is missing required fields
    #[error("{0}")]
    BadRequest(String),

    /// No bearer credential on a protected route
    #[error("Missing access token")]
    MissingCredential,

    /// Refresh cookie absent
    #[error("Missing refresh token")]
    MissingRefreshToken,

    /// A credential, challenge or proof was rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Server-side failure; detail is logged, not returned
    #[error("Internal server error")]
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Rejected(reason) => ApiError::Auth(reason),
            SessionError::Signing(detail) => ApiError::Internal(detail),
        }
    }
}

impl ApiError {
    /// Status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::ChallengeExpired | AuthError::ChallengeAbsent) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MissingCredential | ApiError::MissingRefreshToken | ApiError::Auth(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "Request failed");
        }
        let status = self.status();
        (status, Json(Envelope::fail(status.as_u16(), self.to_string()))).into_response()
    }
}
