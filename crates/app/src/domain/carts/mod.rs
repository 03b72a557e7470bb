//! Carts

pub mod background;
pub mod errors;
pub mod models;
mod repositories;
pub mod service;
mod snapshots;
pub mod store;

pub use background::BackgroundTasks;
pub use errors::{CartStoreError, CartsServiceError};
pub use service::*;
pub use store::{CartStore, PgCartStore};
