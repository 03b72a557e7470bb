//! Catalog client errors.

use thiserror::Error;

use crate::auth::TokenError;

/// Errors that can occur when calling the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog does not know the product.
    #[error("product not found")]
    ProductNotFound,

    /// The catalog rejected our bearer token even after a refresh.
    #[error("catalog rejected service credentials")]
    Unauthorized,

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog returned a non-2xx response.
    #[error("unexpected response from catalog: {0}")]
    UnexpectedResponse(String),

    /// No token could be obtained for the call.
    #[error("could not obtain service token")]
    Token(#[from] TokenError),
}
