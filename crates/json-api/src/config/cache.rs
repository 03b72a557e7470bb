//! Cache Config

use std::time::Duration;

use clap::Args;

/// Cart snapshot cache settings.
#[derive(Debug, Args)]
pub struct CacheConfig {
    /// Redis connection string
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: String,

    /// Lifetime of a cached cart snapshot in seconds
    #[arg(long, env = "CART_CACHE_TTL_SECONDS", default_value_t = 2_592_000_u64)]
    pub cart_cache_ttl_seconds: u64,
}

impl CacheConfig {
    /// Snapshot lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cart_cache_ttl_seconds)
    }
}
