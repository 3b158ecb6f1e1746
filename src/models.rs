use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount: u32,
}

#[derive(Deserialize)]
pub struct NewOrder {
    pub delivery_address: String,
    #[serde(default)]
    pub promocode: String,
    pub user_id: i64,
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

// Flat export row, one per order
#[derive(Serialize)]
pub struct OrderRow {
    pub id: i64,
    pub delivery_address: String,
    pub promocode: String,
    pub user_id: i64,
    pub product_ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct OrdersExport {
    pub orders: Vec<OrderRow>,
}

// Rich per-user export, with the user and products embedded
#[derive(Serialize)]
pub struct UserOrderExport {
    pub id: i64,
    pub delivery_address: String,
    pub promocode: String,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
    pub products: Vec<ProductSummary>,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub discount: u32,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub errors: Vec<String>,
}
