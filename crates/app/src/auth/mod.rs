//! Outbound service authentication.

mod client_credentials;
mod errors;
mod secret;

use async_trait::async_trait;
use mockall::automock;

pub use client_credentials::{ClientCredentialsConfig, ClientCredentialsTokenProvider};
pub use errors::TokenError;
pub use secret::ClientSecret;

/// Supplies bearer tokens for calls to other services.
#[automock]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token valid for at least the refresh margin, fetching a new
    /// one when needed.
    async fn token(&self) -> Result<String, TokenError>;

    /// Drop `stale` from the cache after the remote side rejected it.
    async fn invalidate(&self, stale: &str);
}
