mod cache;
mod config;
mod error;
mod handlers;
mod importer;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod store;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let state = Arc::new(AppState::new(
        args.rate_limit,
        args.rate_window,
        args.export_cache_ttl,
    ));
    if args.seed {
        state.store.seed_demo();
    }

    let app = handlers::router(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!("Shop API running on http://localhost:{}", args.port);
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit,
        args.rate_window
    );
    tracing::info!(
        "User-orders export cached for {} seconds",
        args.export_cache_ttl
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
