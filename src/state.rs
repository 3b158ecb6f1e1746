use std::sync::Arc;

use crate::cache::TtlCache;
use crate::rate_limit::RateLimiter;
use crate::store::Store;

// App's shared state. The limiter and the export handlers share one cache
// instance, keyed by prefix.
pub struct AppState {
    pub store: Store,
    pub cache: Arc<TtlCache>,
    pub limiter: RateLimiter,
    pub export_cache_ttl: u64,
}

impl AppState {
    pub fn new(rate_limit: usize, rate_window: u64, export_cache_ttl: u64) -> Self {
        let cache = Arc::new(TtlCache::new());
        Self {
            store: Store::new(),
            limiter: RateLimiter::new(rate_limit, rate_window, Arc::clone(&cache)),
            cache,
            export_cache_ttl,
        }
    }
}
