//! Token errors.

use thiserror::Error;

/// Errors raised while obtaining a bearer token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth service returned a non-2xx response.
    #[error("unexpected response from auth service: {0}")]
    UnexpectedResponse(String),

    /// The issued token carried an expiry that is not a valid timestamp.
    #[error("invalid token expiry: {0}")]
    InvalidExpiry(#[from] jiff::Error),
}
