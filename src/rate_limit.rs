use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{TtlCache, now_secs};
use crate::metrics::{CACHE_SIZE, RATE_LIMITED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::state::AppState;

// Sliding-window limiter over the shared cache. The cache is the only state,
// so any number of server processes pointed at one cache enforce one combined
// quota. The read-filter-write in check() is not atomic: two in-flight
// requests from the same client can both be admitted at the boundary, which
// over-admits by at most the number of concurrent requests minus one.
pub struct RateLimiter {
    requests_limit: usize,
    time_window: u64,
    cache: Arc<TtlCache>,
}

#[derive(Debug)]
pub enum Decision {
    Admitted { remaining: usize, reset: i64 },
    Denied { retry_after: u64 },
}

impl RateLimiter {
    pub fn new(requests_limit: usize, time_window: u64, cache: Arc<TtlCache>) -> Self {
        Self {
            requests_limit,
            time_window,
            cache,
        }
    }

    pub fn requests_limit(&self) -> usize {
        self.requests_limit
    }

    pub fn time_window(&self) -> u64 {
        self.time_window
    }

    // One admission decision for one client at one instant. The caller
    // supplies the clock, so the window logic can be exercised without
    // waiting on real time.
    pub fn check(&self, client: &str, now: f64) -> Decision {
        let key = format!("throttle_{client}");
        let window = self.time_window as f64;

        let mut history: Vec<f64> = self
            .cache
            .get(&key, now)
            .and_then(|payload| serde_json::from_str(&payload).ok())
            .unwrap_or_default();

        history.retain(|&t| now - t < window);

        if history.len() >= self.requests_limit {
            // A denied request is not recorded, so it does not eat quota
            let oldest = history.iter().copied().fold(f64::INFINITY, f64::min);
            let retry_after = (window - (now - oldest)).max(0.0) as u64;
            return Decision::Denied { retry_after };
        }

        history.push(now);
        let remaining = self.requests_limit - history.len();
        let payload = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());
        self.cache.set(&key, payload, window, now);

        Decision::Admitted {
            remaining,
            reset: now as i64 + self.time_window as i64,
        }
    }
}

// First hop of X-Forwarded-For when present, otherwise the socket peer. The
// first hop is trusted as-is; only sound behind a proxy we control.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn throttle(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer);
    let now = now_secs();

    match state.limiter.check(&client, now) {
        Decision::Denied { retry_after } => {
            RATE_LIMITED_TOTAL.inc();
            tracing::warn!(%client, retry_after, "rate limit exceeded");
            let body = json!({
                "error": "Rate limit exceeded",
                "message": format!(
                    "You have exceeded the limit of {} requests per {} seconds.",
                    state.limiter.requests_limit(),
                    state.limiter.time_window(),
                ),
                "retry_after": format!("{retry_after} seconds"),
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
        Decision::Admitted { remaining, reset } => {
            CACHE_SIZE.set(state.cache.len() as f64);

            let started = Instant::now();
            let mut response = next.run(request).await;
            REQUEST_LATENCY.observe(started.elapsed().as_secs_f64());

            let headers = response.headers_mut();
            headers.insert(
                "x-ratelimit-limit",
                HeaderValue::from(state.limiter.requests_limit()),
            );
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            headers.insert("x-ratelimit-reset", HeaderValue::from(reset));
            response
        }
    }
}
