//! State

use std::sync::Arc;

use trolley_app::{
    context::AppContext,
    domain::carts::{BackgroundTasks, CartsService},
};

/// Services shared by every request handler.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) carts: Arc<dyn CartsService>,
    pub(crate) background: BackgroundTasks,
}

impl State {
    #[must_use]
    pub(crate) fn new(carts: Arc<dyn CartsService>, background: BackgroundTasks) -> Self {
        Self { carts, background }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: &AppContext) -> Arc<Self> {
        Arc::new(Self::new(Arc::clone(&app.carts), app.background.clone()))
    }
}
