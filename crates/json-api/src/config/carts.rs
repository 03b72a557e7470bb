//! Cart Operation Config

use std::time::Duration;

use clap::Args;

/// Deadlines applied by the carts service.
#[derive(Debug, Args)]
pub struct CartsConfig {
    /// Deadline for a background cache refresh in seconds
    #[arg(long, env = "CART_BACKGROUND_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub cart_background_timeout_seconds: u64,

    /// Deadline for each store, cache or catalog call in milliseconds
    #[arg(long, env = "CART_CALL_TIMEOUT_MS", default_value_t = 3_000_u64)]
    pub cart_call_timeout_ms: u64,
}

impl CartsConfig {
    /// Deadline for one background task.
    #[must_use]
    pub fn background_timeout(&self) -> Duration {
        Duration::from_secs(self.cart_background_timeout_seconds)
    }

    /// Deadline for one dependency call.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.cart_call_timeout_ms)
    }
}
