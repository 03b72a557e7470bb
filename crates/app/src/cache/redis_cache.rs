//! Redis-backed cart cache.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use super::{CacheError, CartCache};

/// [`CartCache`] over a Redis connection manager, which multiplexes commands
/// and reconnects on failure.
#[derive(Clone)]
pub struct RedisCartCache {
    connection: ConnectionManager,
}

impl RedisCartCache {
    /// Connect to the Redis instance at `url`, e.g. `redis://localhost:6379`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection })
    }
}

impl fmt::Debug for RedisCartCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCartCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl CartCache for RedisCartCache {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut connection = self.connection.clone();

        Ok(connection.get::<_, Option<Vec<u8>>>(key).await?)
    }

    async fn write(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();

        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);

        connection.set_ex::<_, _, ()>(key, value, seconds).await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();

        connection.del::<_, ()>(key).await?;

        Ok(())
    }

    async fn read_then_delete(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut connection = self.connection.clone();

        Ok(connection.get_del::<_, Option<Vec<u8>>>(key).await?)
    }
}
