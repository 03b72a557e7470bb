//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    auth::{ClientCredentialsConfig, ClientCredentialsTokenProvider, TokenError},
    cache::{CacheError, RedisCartCache},
    catalog::{CatalogError, HttpCatalogClient, HttpCatalogConfig},
    database::{self, Db, PoolSettings},
    domain::carts::{
        BackgroundTasks, CachedCartsService, CartsService, CartsSettings, PgCartStore,
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to connect to cart cache")]
    Cache(#[source] CacheError),

    #[error("failed to build auth client")]
    Token(#[source] TokenError),

    #[error("failed to build catalog client")]
    Catalog(#[source] CatalogError),
}

/// Everything needed to wire the application's dependencies.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub pool: PoolSettings,

    /// Apply bundled migrations before serving.
    pub run_migrations: bool,

    pub redis_url: String,
    pub catalog: HttpCatalogConfig,
    pub auth: ClientCredentialsConfig,
    pub carts: CartsSettings,

    /// Shared by all detached cache maintenance tasks.
    pub background: BackgroundTasks,
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,

    /// Handle on the carts service's detached work, drained at shutdown.
    pub background: BackgroundTasks,
}

impl AppContext {
    /// Connect to the store, cache and remote services described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the database or cache is unreachable, migrations
    /// fail, or an HTTP client cannot be built.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database_url, config.pool)
            .await
            .map_err(AppInitError::Database)?;

        if config.run_migrations {
            info!("applying database migrations");

            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        let cache = RedisCartCache::connect(&config.redis_url)
            .await
            .map_err(AppInitError::Cache)?;

        let tokens =
            ClientCredentialsTokenProvider::new(config.auth).map_err(AppInitError::Token)?;

        let catalog = HttpCatalogClient::new(config.catalog, Arc::new(tokens))
            .map_err(AppInitError::Catalog)?;

        let carts = CachedCartsService::new(
            Arc::new(PgCartStore::new(Db::new(pool))),
            Arc::new(cache),
            Arc::new(catalog),
            config.background.clone(),
            config.carts,
        );

        Ok(Self {
            carts: Arc::new(carts),
            background: config.background,
        })
    }
}
