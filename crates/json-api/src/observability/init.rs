//! Tracing subscriber lifecycle management.

use tracing::info;

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, settings};

/// Runtime observability state.
#[derive(Debug)]
pub(crate) struct Observability {
    log_format: &'static str,
}

impl Observability {
    /// Initialize structured logging and request-level settings.
    pub(crate) fn init(config: &ServerConfig) -> Result<Self, ObservabilityError> {
        settings::apply_runtime_config(config);

        let log_format = logging::init_subscriber(config)?;

        Ok(Self { log_format })
    }

    /// Log that telemetry is going away. Log lines are written synchronously,
    /// so there is nothing left to flush.
    pub(crate) fn shutdown(self) {
        info!(log_format = self.log_format, "observability shut down");
    }
}
