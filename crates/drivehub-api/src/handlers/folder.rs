//! Dashboard and folder handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use drivehub_service::DashboardView;

use crate::dto::request::{CreateFolderRequest, validated};
use crate::dto::response::{ApiResponse, outcome_response};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/dashboard
///
/// Pending accounts get the notice instead of a listing.
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<DashboardView>>> {
    let view = state.mirror.dashboard(&auth, None).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/folders/{id}
pub async fn folder_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ApiResponse<DashboardView>>> {
    let view = state.mirror.dashboard(&auth, Some(id)).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<Response> {
    let req = validated(req)?;
    let outcome = state
        .mirror
        .create_folder(&auth, &req.name, req.parent_id)
        .await?;
    Ok(outcome_response(outcome, StatusCode::CREATED))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let outcome = state.mirror.delete_folder(&auth, id).await?;
    Ok(outcome_response(outcome, StatusCode::OK))
}

/// GET /api/verify
pub async fn verify_root(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Response> {
    let outcome = state.mirror.verify_folder(&auth, None).await?;
    Ok(outcome_response(outcome, StatusCode::OK))
}

/// GET /api/folders/{id}/verify
pub async fn verify_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let outcome = state.mirror.verify_folder(&auth, Some(id)).await?;
    Ok(outcome_response(outcome, StatusCode::OK))
}
