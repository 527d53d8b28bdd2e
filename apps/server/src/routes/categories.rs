//! Category handlers. Categories are soft-deleted, and the delete is
//! refused while active products still reference them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use shopfront_core::validation::validate_name;
use shopfront_core::{Capability, Category, Product};
use shopfront_db::Visibility;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// GET /api/categories
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.db.categories().list(Visibility::ActiveOnly).await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/{id} - includes the category's active products.
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<CategoryWithProducts>>> {
    let category = state
        .db
        .categories()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;

    let products = state
        .db
        .products()
        .list_by_category(&id, Visibility::ActiveOnly)
        .await?;

    Ok(Json(ApiResponse::ok(CategoryWithProducts {
        category,
        products,
    })))
}

/// POST /api/categories - admin/manager only.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Category>>)> {
    user.require(Capability::ManageCatalog)?;

    let name = request
        .name
        .as_deref()
        .ok_or_else(|| ApiError::validation("Category name is required"))?;
    validate_name("name", name).map_err(|e| ApiError::validation(e.to_string()))?;

    let category = state
        .db
        .categories()
        .insert(name, request.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            category,
            "Category created successfully",
        )),
    ))
}

/// PUT /api/categories/{id} - admin/manager only.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    user.require(Capability::ManageCatalog)?;

    if let Some(name) = &request.name {
        validate_name("name", name).map_err(|e| ApiError::validation(e.to_string()))?;
    }

    let category = state
        .db
        .categories()
        .update(&id, request.name.as_deref(), request.description.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        category,
        "Category updated successfully",
    )))
}

/// DELETE /api/categories/{id} - soft delete, refused while active
/// products remain in the category.
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    user.require(Capability::ManageCatalog)?;

    state.db.categories().soft_delete(&id).await?;

    Ok(Json(ApiResponse::ok_message(
        "Category deleted successfully",
    )))
}
