//! # API Error Type
//!
//! Unified error type for route handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Error Flow in Shopfront POS                           │
//! │                                                                         │
//! │  handler ── Result<T, ApiError>                                         │
//! │     │                                                                   │
//! │     ├── DbError::NotFound          → 404                                │
//! │     ├── DbError::UniqueViolation   → 409                                │
//! │     ├── CoreError (via Domain)     → 400 / 404 / 409 by variant         │
//! │     ├── auth failures              → 401 / 403                          │
//! │     └── everything else            → 500, details go to the log only    │
//! │                                                                         │
//! │  Response body: {"success": false, "message": "..."}                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::response::ApiResponse;
use shopfront_core::CoreError;
use shopfront_db::DbError;

/// API error carrying the HTTP status class and a user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Role insufficient for the operation (403).
    #[error("{0}")]
    Forbidden(String),

    /// Entity absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Unique value already taken or entity still referenced (409).
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure (500). The wire gets a generic message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{resource} not found"))
    }

    /// Uniform message so login failures don't leak which part was wrong.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid username or password".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

/// Maps domain errors to their HTTP class.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::CategoryInUse { .. } => ApiError::Conflict(err.to_string()),
            // Empty cart, invalid total, price mismatch, oversized discount,
            // insufficient stock, and plain validation all reject the input.
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

/// Maps data-layer errors to their HTTP class.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::Domain(core) => core.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = CoreError::ProductNotFound("x".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = CoreError::InsufficientStock {
            name: "Coke".into(),
            available: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = CoreError::CategoryInUse {
            name: "Drinks".into(),
            active_products: 3,
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_found("Sale", "s1").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = DbError::UniqueViolation {
            field: "products.sku".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = DbError::QueryFailed("boom".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
