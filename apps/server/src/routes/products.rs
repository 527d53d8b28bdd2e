//! Product catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::validation::{
    validate_name, validate_price_cents, validate_search_query, validate_sku,
};
use shopfront_core::{Capability, Product};
use shopfront_db::repository::product::{NewProduct, ProductPatch};
use shopfront_db::Visibility;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    pub reorder_level: Option<i64>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub cost_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
    pub reorder_level: Option<i64>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.db.products().list(Visibility::ActiveOnly).await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state
        .db
        .products()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    Ok(Json(ApiResponse::ok(product)))
}

/// GET /api/products/search/{query}
pub async fn search(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(query): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let query = validate_search_query(&query).map_err(|e| ApiError::validation(e.to_string()))?;
    let products = state.db.products().search(&query, 50).await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// POST /api/products - admin/manager only.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Product>>)> {
    user.require(Capability::ManageCatalog)?;

    validate_name("name", &request.name).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_sku(&request.sku).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_price_cents(request.cost_price_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    validate_price_cents(request.selling_price_cents)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    if request.stock_quantity < 0 {
        return Err(ApiError::validation("Stock quantity must not be negative"));
    }

    let product = state
        .db
        .products()
        .insert(NewProduct {
            name: request.name,
            sku: request.sku,
            barcode: request.barcode,
            description: request.description,
            cost_price_cents: request.cost_price_cents,
            selling_price_cents: request.selling_price_cents,
            stock_quantity: request.stock_quantity,
            reorder_level: request.reorder_level.unwrap_or(10),
            category_id: request.category_id,
            supplier_id: request.supplier_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            product,
            "Product created successfully",
        )),
    ))
}

/// PUT /api/products/{id} - admin/manager only.
///
/// Stock is not updatable here; it only moves through checkout and
/// recorded stock movements.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    user.require(Capability::ManageCatalog)?;

    if let Some(name) = &request.name {
        validate_name("name", name).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if let Some(sku) = &request.sku {
        validate_sku(sku).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    for price in [request.cost_price_cents, request.selling_price_cents]
        .into_iter()
        .flatten()
    {
        validate_price_cents(price).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let product = state
        .db
        .products()
        .update(
            &id,
            ProductPatch {
                name: request.name,
                sku: request.sku,
                barcode: request.barcode,
                description: request.description,
                cost_price_cents: request.cost_price_cents,
                selling_price_cents: request.selling_price_cents,
                reorder_level: request.reorder_level,
                category_id: request.category_id,
                supplier_id: request.supplier_id,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        product,
        "Product updated successfully",
    )))
}

/// DELETE /api/products/{id} - soft delete, admin/manager only.
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    user.require(Capability::ManageCatalog)?;

    state.db.products().soft_delete(&id).await?;

    Ok(Json(ApiResponse::ok_message("Product deleted successfully")))
}
