//! HTTP handlers. Each one extracts validated input, calls the controller and
//! maps the outcome to a status code.

use crate::{
    api::{
        AppState,
        error::ApiError,
        extract::{Pagination, ProductId, ValidJson},
    },
    core::HealthReport,
    models::{Product, ProductCreate, ProductUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.check())
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.products.create(request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .products
        .get_all(pagination.skip, pagination.limit)
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    ProductId(id): ProductId,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get_by_id(id).await?))
}

pub async fn get_product_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get_by_name(&name).await?))
}

/// Serves both PUT and PATCH; either way only the supplied fields change.
pub async fn update_product(
    State(state): State<AppState>,
    ProductId(id): ProductId,
    ValidJson(update): ValidJson<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.update(id, update).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ProductId(id): ProductId,
) -> Result<StatusCode, ApiError> {
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::from_status(StatusCode::NOT_FOUND)
}
