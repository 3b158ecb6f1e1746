use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::metrics::ORDERS_CREATED;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: u32,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub delivery_address: String,
    pub promocode: String,
    pub user_id: i64,
    pub product_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

// In-memory store backing the API. Lookups clone out of the maps so callers
// never hold a shard lock across an await point.
pub struct Store {
    users: DashMap<i64, User>,
    products: DashMap<i64, Product>,
    orders: DashMap<i64, Order>,
    next_user_id: AtomicI64,
    next_product_id: AtomicI64,
    next_order_id: AtomicI64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            products: DashMap::new(),
            orders: DashMap::new(),
            next_user_id: AtomicI64::new(1),
            next_product_id: AtomicI64::new(1),
            next_order_id: AtomicI64::new(1),
        }
    }

    pub fn add_user(&self, username: &str, first_name: &str, last_name: &str) -> User {
        let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn add_product(&self, name: &str, description: &str, price: f64, discount: u32) -> Product {
        let id = self.next_product_id.fetch_add(1, Ordering::Relaxed);
        let product = Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price,
            discount,
            created_at: Utc::now(),
            archived: false,
        };
        self.products.insert(id, product.clone());
        product
    }

    pub fn product(&self, id: i64) -> Option<Product> {
        self.products.get(&id).map(|p| p.clone())
    }

    // All products sorted by name, optionally narrowed by a case-insensitive
    // substring match on name or description
    pub fn products(&self, search: Option<&str>) -> Vec<Product> {
        let needle = search.map(|s| s.to_lowercase());
        let mut out: Vec<Product> = self
            .products
            .iter()
            .map(|p| p.clone())
            .filter(|p| match &needle {
                Some(n) => {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    // Soft delete
    pub fn archive_product(&self, id: i64) -> Option<Product> {
        let mut product = self.products.get_mut(&id)?;
        product.archived = true;
        Some(product.clone())
    }

    // Requested ids that exist, deduplicated, in first-appearance order
    pub fn existing_product_ids(&self, requested: &[i64]) -> Vec<i64> {
        let mut found = Vec::new();
        for id in requested {
            if self.products.contains_key(id) && !found.contains(id) {
                found.push(*id);
            }
        }
        found
    }

    pub fn create_order(&self, delivery_address: &str, promocode: &str, user_id: i64) -> Order {
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let order = Order {
            id,
            delivery_address: delivery_address.to_string(),
            promocode: promocode.to_string(),
            user_id,
            product_ids: Vec::new(),
            created_at: Utc::now(),
        };
        self.orders.insert(id, order.clone());
        ORDERS_CREATED.inc();
        order
    }

    pub fn set_order_products(&self, order_id: i64, product_ids: Vec<i64>) -> Option<Order> {
        let mut order = self.orders.get_mut(&order_id)?;
        order.product_ids = product_ids;
        Some(order.clone())
    }

    pub fn order(&self, id: i64) -> Option<Order> {
        self.orders.get(&id).map(|o| o.clone())
    }

    // Newest first
    pub fn orders(&self) -> Vec<Order> {
        let mut out: Vec<Order> = self.orders.iter().map(|o| o.clone()).collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out
    }

    pub fn delete_order(&self, id: i64) -> bool {
        self.orders.remove(&id).is_some()
    }

    // Demo fixtures, the same shop the CSV import examples refer to
    pub fn seed_demo(&self) {
        let user = self.add_user("testuser", "Test", "User");
        let laptop = self.add_product("Laptop", "Powerful laptop for work and games", 75000.0, 10);
        let phone = self.add_product("Smartphone", "Modern smartphone with a great camera", 45000.0, 5);
        let headphones =
            self.add_product("Headphones", "Wireless headphones with noise cancelling", 15000.0, 0);

        let order = self.create_order("10 Pushkin St, Moscow", "SALE10", user.id);
        self.set_order_products(order.id, vec![laptop.id, phone.id]);
        let order = self.create_order("1 Nevsky Ave, Saint Petersburg", "", user.id);
        self.set_order_products(order.id, vec![laptop.id, phone.id, headphones.id]);

        tracing::info!(
            users = 1,
            products = 3,
            orders = 2,
            "seeded demo fixtures"
        );
    }
}
