use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewProduct, ProductQuery};
use crate::state::AppState;
use crate::store::Product;

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    Json(state.store.products(query.search.as_deref()))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewProduct>,
) -> (StatusCode, Json<Product>) {
    let product = state
        .store
        .add_product(&new.name, &new.description, new.price, new.discount);
    tracing::info!(id = product.id, name = %product.name, "product created");
    (StatusCode::CREATED, Json(product))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    state
        .store
        .product(id)
        .map(Json)
        .ok_or(AppError::ProductNotFound(id))
}

pub async fn archive_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .store
        .archive_product(id)
        .ok_or(AppError::ProductNotFound(id))?;
    tracing::info!(id, "product archived");
    Ok(Json(product))
}
