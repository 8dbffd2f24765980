//! Admin user approval handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use drivehub_service::user::{AdminDashboard, ApprovalChange};

use crate::dto::request::{BulkUsersRequest, validated};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<AdminDashboard>>> {
    require_admin(&auth)?;
    let dashboard = state.approvals.admin_dashboard(&auth).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// POST /api/admin/users/{id}/approve
pub async fn approve_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ApprovalChange>>> {
    require_admin(&auth)?;
    let change = state.approvals.approve(&auth, id).await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// POST /api/admin/users/{id}/revoke
pub async fn revoke_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ApprovalChange>>> {
    require_admin(&auth)?;
    let change = state.approvals.revoke(&auth, id).await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// POST /api/admin/users/approve
pub async fn approve_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkUsersRequest>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    require_admin(&auth)?;
    let req = validated(req)?;
    let count = state.approvals.approve_many(&auth, &req.user_ids).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/admin/users/revoke
pub async fn revoke_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkUsersRequest>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    require_admin(&auth)?;
    let req = validated(req)?;
    let count = state.approvals.revoke_many(&auth, &req.user_ids).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
