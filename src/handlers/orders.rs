use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::cache::now_secs;
use crate::error::AppError;
use crate::models::{NewOrder, OrderRow, OrdersExport, ProductSummary, UserOrderExport, UserSummary};
use crate::state::AppState;
use crate::store::Order;

pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.orders())
}

// Strict creation path: unlike the CSV import, an unknown user or product
// rejects the whole request.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let user = state
        .store
        .user(new.user_id)
        .ok_or(AppError::UserNotFound(new.user_id))?;
    for id in &new.product_ids {
        if state.store.product(*id).is_none() {
            return Err(AppError::ProductNotFound(*id));
        }
    }

    let mut order = state
        .store
        .create_order(&new.delivery_address, &new.promocode, user.id);
    if !new.product_ids.is_empty() {
        if let Some(updated) = state.store.set_order_products(order.id, new.product_ids) {
            order = updated;
        }
    }
    tracing::info!(id = order.id, user_id = user.id, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    state
        .store
        .order(id)
        .map(Json)
        .ok_or(AppError::OrderNotFound(id))
}

pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.store.delete_order(id) {
        tracing::info!(id, "order deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::OrderNotFound(id))
    }
}

pub async fn export_orders(State(state): State<Arc<AppState>>) -> Json<OrdersExport> {
    let orders = state
        .store
        .orders()
        .into_iter()
        .map(|o| OrderRow {
            id: o.id,
            delivery_address: o.delivery_address,
            promocode: o.promocode,
            user_id: o.user_id,
            product_ids: o.product_ids,
        })
        .collect();
    Json(OrdersExport { orders })
}

// Per-user export, served from the shared cache while the snapshot is fresh
pub async fn export_user_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let cache_key = format!("user_orders_export_{user_id}");
    let now = now_secs();

    if let Some(cached) = state.cache.get(&cache_key, now) {
        return Ok(json_body(cached));
    }

    let user = state
        .store
        .user(user_id)
        .ok_or(AppError::UserNotFound(user_id))?;

    let mut orders: Vec<Order> = state
        .store
        .orders()
        .into_iter()
        .filter(|o| o.user_id == user_id)
        .collect();
    orders.sort_by_key(|o| o.id);

    let exports: Vec<UserOrderExport> = orders
        .into_iter()
        .map(|o| UserOrderExport {
            id: o.id,
            delivery_address: o.delivery_address,
            promocode: o.promocode,
            created_at: o.created_at,
            user: UserSummary {
                id: user.id,
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
            },
            products: o
                .product_ids
                .iter()
                .filter_map(|pid| state.store.product(*pid))
                .map(|p| ProductSummary {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    discount: p.discount,
                })
                .collect(),
        })
        .collect();

    let payload = serde_json::to_string(&exports).unwrap_or_else(|_| "[]".to_string());
    state
        .cache
        .set(&cache_key, payload.clone(), state.export_cache_ttl as f64, now);
    Ok(json_body(payload))
}

fn json_body(payload: String) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    )
        .into_response()
}
