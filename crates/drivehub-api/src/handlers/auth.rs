//! Auth handlers: register and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use drivehub_service::user::{LoginResponse, Registration};

use crate::dto::request::{LoginBody, RegisterBody, validated};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/auth/register
///
/// The account starts pending; the response says so.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Registration>>)> {
    let body = validated(body)?;
    let registration = state.registration.register(body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(registration))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let body = validated(body)?;
    let response = state.registration.login(body.into()).await?;
    Ok(Json(ApiResponse::ok(response)))
}
