//! # API Routes
//!
//! Route registration for the REST surface:
//!
//! - [`auth`] - login, registration, current user
//! - [`products`] - catalog CRUD and search
//! - [`categories`] - category CRUD (soft delete)
//! - [`sales`] - checkout and sale reads
//! - [`inventory`] - stock movements, summary, history
//! - [`reports`] - date-range aggregations
//! - [`dashboard`] - today stats, recent sales, top products, trend
//! - [`settings`] - the configuration singleton

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod inventory;
pub mod products;
pub mod reports;
pub mod sales;
pub mod settings;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Builds the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(health))
        // Authentication
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::me))
        // Catalog
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/products/search/{query}", get(products::search))
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            get(categories::get_by_id)
                .put(categories::update)
                .delete(categories::remove),
        )
        // Sales
        .route("/api/sales", get(sales::list).post(sales::create))
        .route("/api/sales/{id}", get(sales::get_by_id))
        // Inventory
        .route("/api/inventory/summary", get(inventory::summary))
        .route("/api/inventory/movements", post(inventory::record_movement))
        .route(
            "/api/inventory/history/{productId}",
            get(inventory::history),
        )
        // Reports
        .route("/api/reports/sales-summary", get(reports::sales_summary))
        .route(
            "/api/reports/sales-by-product",
            get(reports::sales_by_product),
        )
        .route(
            "/api/reports/sales-by-cashier",
            get(reports::sales_by_cashier),
        )
        .route(
            "/api/reports/payment-methods",
            get(reports::payment_methods),
        )
        .route(
            "/api/reports/profit-analysis",
            get(reports::profit_analysis),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/recent-sales", get(dashboard::recent_sales))
        .route("/api/dashboard/top-products", get(dashboard::top_products))
        .route("/api/dashboard/sales-trend", get(dashboard::sales_trend))
        // Settings
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/api/settings/reset", post(settings::reset_settings))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin = %origin, "Invalid CORS origin, falling back to none");
            layer
        }
    }
}

/// Unauthenticated liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "Shopfront API running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
