//! Redis-backed cache implementation.

use super::service::{Cache, CacheError, CacheResult};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Redis cache with connection pooling via `ConnectionManager`.
///
/// All operations are fail-open: errors are logged but don't propagate to
/// callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and
    /// configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl: Duration) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl,
        })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(Some(value)) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let ttl = ttl.unwrap_or(self.default_ttl);

        match conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await {
            Ok(_) => {
                debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", key);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
