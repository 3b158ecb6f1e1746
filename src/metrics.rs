use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("shop_requests_total", "Total number of requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "shop_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref ORDERS_CREATED: Counter = register_counter!(
        "shop_orders_created_total",
        "Orders created via the API and CSV import"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "shop_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("shop_cache_size", "Current number of entries in the shared cache").unwrap();
}
