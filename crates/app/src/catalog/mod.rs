//! Product catalog client.

mod errors;
mod http;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;

use crate::domain::carts::models::ProductUuid;

pub use errors::CatalogError;
pub use http::{HttpCatalogClient, HttpCatalogConfig};

/// Current price and stock level of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuote {
    pub price: Decimal,
    pub available_qty: i64,
}

/// Stock and price lookups against the catalog service.
///
/// Every capability is idempotent and safe to retry.
#[automock]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn price_and_availability(&self, product: ProductUuid)
    -> Result<ProductQuote, CatalogError>;

    /// Quantity currently available for sale.
    async fn availability(&self, product: ProductUuid) -> Result<i64, CatalogError>;

    /// Whether `qty` units can be checked out right now.
    async fn verify_for_checkout(&self, product: ProductUuid, qty: i32)
    -> Result<bool, CatalogError>;
}
