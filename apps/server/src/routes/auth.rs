//! Authentication handlers: login, registration, current user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::validation::{validate_name, validate_username};
use shopfront_core::{Capability, Role, User};
use shopfront_db::NewUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

/// POST /api/auth/login
///
/// Login failures return one uniform message so usernames can't be
/// enumerated; a disabled account is the one deliberate exception.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginData>>> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let user = state
        .db
        .users()
        .find_by_username(request.username.trim())
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is disabled".to_string()));
    }

    state.db.users().touch_last_login(&user.id).await?;

    let token = state.jwt.generate_token(&user)?;

    info!(username = %user.username, "Login successful");

    Ok(Json(ApiResponse::ok_with_message(
        LoginData { token, user },
        "Login successful",
    )))
}

/// POST /api/auth/register - admin only.
pub async fn register(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    current_user.require(Capability::ManageUsers)?;

    validate_username(&request.username).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_name("fullName", &request.full_name)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    if request.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .users()
        .insert(NewUser {
            username: request.username.trim().to_string(),
            password_hash,
            full_name: request.full_name.trim().to_string(),
            role: request.role,
        })
        .await?;

    info!(username = %user.username, role = ?user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            user,
            "User registered successfully",
        )),
    ))
}

/// GET /api/auth/me - fresh user data for the token's subject.
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .db
        .users()
        .find_by_id(&current_user.id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(ApiResponse::ok(user)))
}
