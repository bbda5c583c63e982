//! Redis-backed cache implementation.

use super::service::{CacheError, CacheLookup, CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache implementation for fast URL lookups.
///
/// Records are stored as JSON under `url:{code}` with `SET EX`. Connection reuse
/// is handled by a multiplexed `ConnectionManager`. Every call is bounded by
/// `op_timeout`; errors are returned to the caller, which decides whether to fall
/// back to the durable store.
pub struct RedisCache {
    client: ConnectionManager,
    op_timeout: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `op_timeout` - upper bound for each cache call (`CACHE_TIMEOUT_MS`)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> CacheResult<Self> {
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
            op_timeout,
            key_prefix: "url:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, code: &str) -> String {
        format!("{}{}", self.key_prefix, code)
    }

    /// Runs a Redis command under the configured timeout.
    async fn bounded<T, F>(&self, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::OperationError(e.to_string())),
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl UrlCache for RedisCache {
    async fn get(&self, code: &str) -> CacheResult<CacheLookup> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let payload = self.bounded(conn.get::<_, Option<String>>(&key)).await?;

        match payload {
            Some(json) => {
                debug!("Cache HIT: {}", code);
                Ok(CacheLookup::Hit(serde_json::from_str(&json)?))
            }
            None => {
                debug!("Cache MISS: {}", code);
                Ok(CacheLookup::Miss)
            }
        }
    }

    async fn set(&self, code: &str, record: &UrlRecord, ttl: Duration) -> CacheResult<()> {
        let key = self.build_key(code);
        let payload = serde_json::to_string(record)?;
        let mut conn = self.client.clone();
        let ttl_seconds = ttl.as_secs().max(1);

        self.bounded(conn.set_ex::<_, _, ()>(&key, payload, ttl_seconds))
            .await?;

        debug!("Cache SET: {} (TTL: {}s)", code, ttl_seconds);
        Ok(())
    }

    async fn delete(&self, code: &str) -> CacheResult<()> {
        let key = self.build_key(code);
        let mut conn = self.client.clone();

        let deleted = self.bounded(conn.del::<_, i32>(&key)).await?;
        if deleted > 0 {
            debug!("Cache DELETE: {}", code);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(conn.ping::<()>()).await.is_ok()
    }
}
