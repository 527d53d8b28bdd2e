//! Settings handlers. The singleton row is provisioned at startup, so the
//! read path never creates it implicitly.

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::{Capability, Settings};
use shopfront_db::SettingsPatch;

/// GET /api/settings - readable by all authenticated users.
pub async fn get_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Settings>>> {
    let settings = state.db.settings().get().await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// PUT /api/settings - admin only, partial update.
pub async fn update_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<ApiResponse<Settings>>> {
    user.require(Capability::ManageSettings)?;

    let settings = state.db.settings().update(patch).await?;

    info!(shop_name = %settings.shop_name, "Settings updated");

    Ok(Json(ApiResponse::ok_with_message(
        settings,
        "Settings updated successfully",
    )))
}

/// POST /api/settings/reset - admin only.
pub async fn reset_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Settings>>> {
    user.require(Capability::ManageSettings)?;

    let settings = state.db.settings().reset().await?;

    Ok(Json(ApiResponse::ok_with_message(
        settings,
        "Settings reset to default",
    )))
}
