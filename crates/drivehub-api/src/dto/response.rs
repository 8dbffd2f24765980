//! Response DTOs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use drivehub_service::MirrorOutcome;

/// Standard success wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the operation completed.
    pub success: bool,
    /// Response payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Respond with a mirror outcome.
///
/// A completed outcome is `success_status`; a failed remote call is
/// `502 Bad Gateway` with `success: false` and the user-facing message
/// in `data.message`.
pub fn outcome_response<T: Serialize>(
    outcome: MirrorOutcome<T>,
    success_status: StatusCode,
) -> Response {
    let (status, success) = if outcome.is_completed() {
        (success_status, true)
    } else {
        (StatusCode::BAD_GATEWAY, false)
    };
    (
        status,
        Json(ApiResponse {
            success,
            data: outcome,
        }),
    )
        .into_response()
}

/// Count result for bulk operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Number of records changed.
    pub count: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Configured remote provider.
    pub remote_provider: String,
    /// Whether the remote client has been built yet.
    pub remote_initialized: bool,
}
