//! Inventory handlers: manual stock movements, summary, and the per-product
//! movement ledger.

use axum::extract::{Path, Query, State};
use axum::Json;
use futures::TryStreamExt;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::{Capability, MovementKind, StockMovement, DEFAULT_HISTORY_LIMIT};
use shopfront_db::repository::stock::MovementOutcome;
use shopfront_db::{InventorySummary, NewMovement};

/// Wire form of a manual movement direction: `IN` or `OUT`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementDirection {
    In,
    Out,
}

impl From<MovementDirection> for MovementKind {
    fn from(direction: MovementDirection) -> Self {
        match direction {
            MovementDirection::In => MovementKind::In,
            MovementDirection::Out => MovementKind::Out,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub product_id: String,
    #[serde(rename = "type")]
    pub movement: MovementDirection,
    pub quantity: i64,
    pub reason: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// POST /api/inventory/movements - admin/manager only.
///
/// An OUT movement larger than the current stock fails with 400 and the
/// stock level stays untouched.
pub async fn record_movement(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<MovementRequest>,
) -> ApiResult<Json<ApiResponse<MovementOutcome>>> {
    user.require(Capability::AdjustStock)?;

    if request.product_id.trim().is_empty() {
        return Err(ApiError::validation("productId is required"));
    }

    let outcome = state
        .db
        .stock()
        .record_movement(NewMovement {
            product_id: request.product_id,
            movement: request.movement.into(),
            quantity: request.quantity,
            reason: request.reason,
            reference: request.reference,
            user_id: user.id,
        })
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        outcome,
        "Stock updated successfully",
    )))
}

/// GET /api/inventory/summary
pub async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ApiResponse<InventorySummary>>> {
    let summary = state.db.stock().summary().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/inventory/history/{productId}?limit
///
/// The repository yields the ledger as a lazy stream; the HTTP layer is
/// where it gets collected into a JSON array.
pub async fn history(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let stock = state.db.stock();
    let movements: Vec<StockMovement> = stock.history(&product_id, limit).try_collect().await?;

    Ok(Json(ApiResponse::ok(movements)))
}
