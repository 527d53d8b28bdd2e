//! Sale handlers: checkout and read paths.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::reports::ReportRange;
use shopfront_core::{Capability, CartLine, Discount, PaymentMethod};
use shopfront_db::{Checkout, CheckoutReceipt, SaleWithDetails};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub items: Vec<CartLine>,
    pub discount: Option<Discount>,
    pub payment_type: PaymentMethod,
    /// Cash received; the payment records the computed total when absent.
    pub cash_amount_cents: Option<i64>,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// POST /api/sales - the checkout path.
///
/// The entire write (sale, items, payment, stock decrements, movement
/// ledger) commits or rolls back as one transaction in the data layer.
/// Totals are computed server-side from re-validated prices; the client
/// only submits the cart, discount, and payment.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CheckoutReceipt>>)> {
    user.require(Capability::Sell)?;

    debug!(lines = request.items.len(), cashier = %user.username, "Checkout requested");

    // Tax configuration is read up front; checkout applies it inside the
    // transaction.
    let settings = state.db.settings().get().await?;

    let receipt = state
        .db
        .sales()
        .checkout(&Checkout {
            lines: request.items,
            discount: request.discount,
            payment_method: request.payment_type,
            tendered_cents: request.cash_amount_cents,
            payment_reference: request.reference,
            user_id: user.id,
            tax: settings.tax_rate(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            receipt,
            "Sale completed successfully",
        )),
    ))
}

/// GET /api/sales?startDate&endDate&limit
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<SaleWithDetails>>>> {
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some(ReportRange::from_dates(start, end)),
        (None, None) => None,
        _ => {
            return Err(ApiError::validation(
                "Both startDate and endDate are required when filtering by date",
            ))
        }
    };

    let sales = state
        .db
        .sales()
        .list(range, query.limit.unwrap_or(50))
        .await?;

    Ok(Json(ApiResponse::ok(sales)))
}

/// GET /api/sales/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<SaleWithDetails>>> {
    let sale = state
        .db
        .sales()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale"))?;

    Ok(Json(ApiResponse::ok(sale)))
}
