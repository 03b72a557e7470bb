//! Cart errors.

use std::error::Error as StdError;

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::domain::carts::models::ProductUuid;

/// Name of the `cart_item.quantity > 0` check.
const QUANTITY_CONSTRAINT: &str = "cart_item_quantity_positive";

/// Errors returned by a [`CartStore`](crate::domain::carts::store::CartStore).
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart not found")]
    CartNotFound,

    #[error("cart item not found")]
    ItemNotFound,

    #[error("quantity must be greater than zero")]
    QtyConstraint,

    #[error("storage error")]
    Storage(#[source] Error),
}

impl From<Error> for CartStoreError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::CartNotFound;
        }

        let (quantity_check, parent_missing) = match error.as_database_error() {
            Some(database_error) => (
                matches!(database_error.kind(), ErrorKind::CheckViolation)
                    && database_error.constraint() == Some(QUANTITY_CONSTRAINT),
                matches!(database_error.kind(), ErrorKind::ForeignKeyViolation),
            ),
            None => (false, false),
        };

        if quantity_check {
            Self::QtyConstraint
        } else if parent_missing {
            Self::CartNotFound
        } else {
            Self::Storage(error)
        }
    }
}

/// Errors surfaced by the cart orchestrator.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("product {0} is out of stock")]
    OutOfStock(ProductUuid),

    #[error("cart contains an invalid item")]
    InvalidItem,

    #[error("internal error")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl CartsServiceError {
    pub(crate) fn internal<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Internal(Box::new(source))
    }
}

impl From<CartStoreError> for CartsServiceError {
    fn from(error: CartStoreError) -> Self {
        match error {
            CartStoreError::CartNotFound | CartStoreError::ItemNotFound => Self::NotFound,
            CartStoreError::QtyConstraint => Self::BadRequest("quantity must be greater than zero"),
            CartStoreError::Storage(_) => Self::internal(error),
        }
    }
}
