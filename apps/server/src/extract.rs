//! Authenticated-user extractor.
//!
//! Handlers that take a [`CurrentUser`] argument require a valid bearer
//! token; the extractor rejects the request with 401 before the handler
//! body runs. Role checks go through [`CurrentUser::require`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;
use shopfront_core::{Capability, Role};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Rejects with 403 unless the user's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Access denied. Insufficient permissions.".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Access denied. No token provided."))?;

        let claims = state.jwt.validate_token(token)?;

        Ok(CurrentUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
