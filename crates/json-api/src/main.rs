//! Trolley JSON API Server

use std::{process, time::Duration};

use salvo::{
    affix_state::inject,
    oapi::{OpenApi, swagger_ui::SwaggerUi},
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info, warn};

use trolley_app::{
    context::{AppConfig, AppContext},
    domain::carts::{BackgroundTasks, CartsSettings},
};

use crate::{config::ServerConfig, observability::Observability, state::State};

mod carts;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Time allowed for in-flight cache maintenance after the server stops.
const BACKGROUND_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn app_config(config: &ServerConfig) -> AppConfig {
    AppConfig {
        database_url: config.database.database_url.clone(),
        pool: config.database.pool_settings(),
        run_migrations: config.database.run_migrations,
        redis_url: config.cache.redis_url.clone(),
        catalog: config.catalog.to_client_config(),
        auth: config.auth.to_client_config(),
        carts: CartsSettings {
            cache_ttl: config.cache.ttl(),
            call_timeout: config.carts.call_timeout(),
        },
        background: BackgroundTasks::new(config.carts.background_timeout()),
    }
}

/// Trolley JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let app = match AppContext::from_config(app_config(&config)).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(&app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(router::app_router());

    let doc = OpenApi::new("Trolley API", env!("CARGO_PKG_VERSION")).merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    if !app.background.shutdown(BACKGROUND_SHUTDOWN_GRACE).await {
        warn!(
            remaining = app.background.len(),
            "background tasks still running at shutdown"
        );
    }

    observability.shutdown();
}
