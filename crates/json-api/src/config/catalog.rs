//! Catalog Config

use std::time::Duration;

use clap::Args;

use trolley_app::catalog::HttpCatalogConfig;

/// Product catalog settings.
#[derive(Debug, Args)]
pub struct CatalogConfig {
    /// Catalog service base URL
    #[arg(long, env = "CATALOG_URL")]
    pub catalog_url: String,

    /// Catalog request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub catalog_timeout_seconds: u64,
}

impl CatalogConfig {
    /// Per-request HTTP timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_seconds)
    }

    /// Settings for the HTTP catalog client.
    #[must_use]
    pub fn to_client_config(&self) -> HttpCatalogConfig {
        HttpCatalogConfig {
            base_url: self.catalog_url.clone(),
            timeout: self.timeout(),
        }
    }
}
