//! Maps domain `AppError` to HTTP responses.
//!
//! `AppError` lives in `drivehub-core`, which knows nothing about HTTP,
//! so handlers return [`ApiError`]; `?` converts into it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use drivehub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::RemoteCall => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Storage
        | ErrorKind::Configuration
        | ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error type returned by handlers and extractors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(err) = self;
        let status = status_for(err.kind);

        let message = if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %err.chain(), "Remote storage unavailable");
            err.message
        } else if status.is_server_error() {
            // Details of local failures stay in the log.
            tracing::error!(kind = %err.kind, error = %err.chain(), "Request failed");
            "An internal error occurred. Please try again later.".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.as_str().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
