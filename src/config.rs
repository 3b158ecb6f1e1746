use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "shop-api")]
#[command(about = "Shop API with CSV order import and per-client rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // How long a cached user-orders export stays fresh, in seconds
    #[arg(long, default_value_t = 300)]
    pub export_cache_ttl: u64,

    // Create a demo user, products and orders at startup
    #[arg(long, default_value_t = false)]
    pub seed: bool,
}
