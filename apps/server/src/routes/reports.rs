//! Report handlers: read-only, point-in-time aggregation over a date range.
//!
//! Rows are loaded by the data layer and reduced by the pure functions in
//! `shopfront_core::reports`; nothing on these paths mutates state.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::reports::{
    self, CashierSales, PaymentMethodsReport, ProductSales, ProfitAnalysis, ReportRange, SaleRow,
    SalesSummary,
};
use shopfront_core::Capability;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RangeQuery {
    /// Both dates are mandatory for report endpoints.
    fn to_range(&self) -> Result<ReportRange, ApiError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok(ReportRange::from_dates(start, end)),
            _ => Err(ApiError::validation(
                "Start date and end date are required",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummaryData {
    pub summary: SalesSummary,
    pub sales: Vec<SaleRow>,
}

/// GET /api/reports/sales-summary?startDate&endDate
pub async fn sales_summary(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<SalesSummaryData>>> {
    user.require(Capability::ViewReports)?;
    let range = query.to_range()?;

    let sales = state.db.reports().load_sales(range).await?;
    let items = state.db.reports().load_sold_items(range).await?;

    let summary = reports::sales_summary(&sales, &items);

    Ok(Json(ApiResponse::ok(SalesSummaryData { summary, sales })))
}

/// GET /api/reports/sales-by-product?startDate&endDate
pub async fn sales_by_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ProductSales>>>> {
    user.require(Capability::ViewReports)?;
    let range = query.to_range()?;

    let items = state.db.reports().load_sold_items(range).await?;

    Ok(Json(ApiResponse::ok(reports::sales_by_product(&items))))
}

/// GET /api/reports/sales-by-cashier?startDate&endDate
pub async fn sales_by_cashier(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<CashierSales>>>> {
    user.require(Capability::ViewReports)?;
    let range = query.to_range()?;

    let sales = state.db.reports().load_sales(range).await?;
    let items = state.db.reports().load_sold_items(range).await?;

    Ok(Json(ApiResponse::ok(reports::sales_by_cashier(
        &sales, &items,
    ))))
}

/// GET /api/reports/payment-methods?startDate&endDate
///
/// A range with no sales yields an empty breakdown and total 0.
pub async fn payment_methods(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<PaymentMethodsReport>>> {
    user.require(Capability::ViewReports)?;
    let range = query.to_range()?;

    let payments = state.db.reports().load_payments(range).await?;

    Ok(Json(ApiResponse::ok(reports::payment_methods(&payments))))
}

/// GET /api/reports/profit-analysis?startDate&endDate
pub async fn profit_analysis(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<ProfitAnalysis>>> {
    user.require(Capability::ViewReports)?;
    let range = query.to_range()?;

    let items = state.db.reports().load_sold_items(range).await?;

    Ok(Json(ApiResponse::ok(reports::profit_analysis(&items))))
}
