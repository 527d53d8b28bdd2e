//! Dashboard handlers. These reuse the report reducers over narrower
//! windows; "today" is local midnight to the next local midnight.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::reports::{self, ReportRange, SalesSummary, TopProduct, TrendPoint};
use shopfront_core::Capability;
use shopfront_db::SaleWithDetails;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryCounts {
    pub total_products: i64,
    pub low_stock: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallCounts {
    pub total_sales: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today: SalesSummary,
    pub inventory: InventoryCounts,
    pub overall: OverallCounts,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductsQuery {
    pub limit: Option<u32>,
    pub period: Option<Period>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    pub days: Option<u32>,
}

/// Reporting window presets for the dashboard.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl Period {
    fn to_range(self, today: NaiveDate) -> ReportRange {
        match self {
            Period::Today => ReportRange::single_day(today),
            Period::Week => ReportRange::trailing_days(today, 7),
            Period::Month => ReportRange::trailing_days(today, 30),
            // Everything ever recorded: from the epoch through today.
            Period::All => ReportRange::from_dates(NaiveDate::default(), today),
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// GET /api/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<DashboardStats>>> {
    user.require(Capability::ViewReports)?;

    let today = ReportRange::single_day(local_today());

    let sales = state.db.reports().load_sales(today).await?;
    let items = state.db.reports().load_sold_items(today).await?;
    let today_summary = reports::sales_summary(&sales, &items);

    let inventory = state.db.stock().summary().await?;
    let total_sales = state.db.sales().count().await?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        today: today_summary,
        inventory: InventoryCounts {
            total_products: inventory.stats.total_products,
            low_stock: inventory.stats.low_stock,
            out_of_stock: inventory.stats.out_of_stock,
        },
        overall: OverallCounts { total_sales },
    })))
}

/// GET /api/dashboard/recent-sales?limit
pub async fn recent_sales(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<ApiResponse<Vec<SaleWithDetails>>>> {
    user.require(Capability::ViewReports)?;

    let sales = state.db.sales().list(None, query.limit.unwrap_or(10)).await?;

    Ok(Json(ApiResponse::ok(sales)))
}

/// GET /api/dashboard/top-products?limit&period
pub async fn top_products(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TopProductsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TopProduct>>>> {
    user.require(Capability::ViewReports)?;

    let range = query.period.unwrap_or_default().to_range(local_today());
    let items = state.db.reports().load_sold_items(range).await?;

    Ok(Json(ApiResponse::ok(reports::top_products(
        &items,
        query.limit.unwrap_or(10) as usize,
    ))))
}

/// GET /api/dashboard/sales-trend?days
pub async fn sales_trend(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TrendPoint>>>> {
    user.require(Capability::ViewReports)?;

    let days = query.days.unwrap_or(7);
    if days == 0 || days > 366 {
        return Err(ApiError::validation("days must be between 1 and 366"));
    }

    let today = local_today();
    let range = ReportRange::trailing_days(today, days);

    let instants = state.db.reports().load_sale_instants(range).await?;
    let rows: Vec<(NaiveDate, i64)> = instants
        .into_iter()
        .map(|(at, cents)| (at.with_timezone(&Local).date_naive(), cents))
        .collect();

    Ok(Json(ApiResponse::ok(reports::sales_trend(
        &rows, today, days,
    ))))
}
