use chrono::Utc;
use dashmap::DashMap;

// Wall clock as float epoch seconds. Read once per request and passed down, so
// the window and TTL logic can be driven with synthetic times in tests.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

// Cache entry with its write time and lifetime
#[derive(Clone)]
struct CacheEntry {
    payload: String,
    stored_at: f64,
    ttl: f64,
}

// Shared TTL key-value cache. A write always refreshes the TTL; an entry past
// its TTL is treated as absent and dropped on read. The throttling middleware
// and the user-orders export cache share one instance, keyed by prefix.
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    // Missing and expired keys both come back as None
    pub fn get(&self, key: &str, now: f64) -> Option<String> {
        let entry = self.entries.get(key)?;
        if now - entry.stored_at < entry.ttl {
            Some(entry.payload.clone())
        } else {
            drop(entry);
            self.entries.remove(key);
            None
        }
    }

    pub fn set(&self, key: &str, payload: String, ttl: f64, now: f64) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                stored_at: now,
                ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
