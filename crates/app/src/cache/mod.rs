//! Cart snapshot cache.

mod errors;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;

use crate::domain::carts::models::UserUuid;

pub use errors::CacheError;
pub use redis_cache::RedisCartCache;

/// Prefix shared by every cart snapshot key.
pub const CART_CACHE_KEY_PREFIX: &str = "cart:";

/// Default lifetime of a cached snapshot (30 days).
pub const DEFAULT_CART_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Cache key holding the snapshot of a user's cart.
#[must_use]
pub fn cart_cache_key(user: UserUuid) -> String {
    format!("{CART_CACHE_KEY_PREFIX}{user}")
}

/// Key-value store of serialized cart snapshots.
///
/// The cache is never authoritative; callers treat any error as a miss.
#[automock]
#[async_trait]
pub trait CartCache: Send + Sync {
    /// Read the bytes stored under `key`, `None` on a miss.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn write(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically read and remove `key`, so at most one caller observes the
    /// stored value.
    async fn read_then_delete(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
}
