//! Per-user settings handlers.

use axum::Json;
use axum::extract::State;

use drivehub_service::user::Settings;

use crate::dto::request::UpdateSettingsRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Settings>>> {
    let settings = state.settings.get(&auth).await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<ApiResponse<Settings>>> {
    let settings = state
        .settings
        .update_share_email(&auth, req.share_email.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(settings)))
}
