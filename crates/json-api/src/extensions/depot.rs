//! Depot helper extensions.

use std::{any::Any, sync::Arc};

use salvo::prelude::{Depot, StatusError};
use tracing::error;

use trolley_app::domain::carts::CartsService;

use crate::state::State;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// The carts service from the injected [`State`].
    fn carts_or_500(&self) -> Result<Arc<dyn CartsService>, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_ignored| {
            error!(
                state = std::any::type_name::<T>(),
                "requested state missing from depot"
            );

            StatusError::internal_server_error()
        })
    }

    fn carts_or_500(&self) -> Result<Arc<dyn CartsService>, StatusError> {
        self.obtain_or_500::<Arc<State>>()
            .map(|state| Arc::clone(&state.carts))
    }
}
