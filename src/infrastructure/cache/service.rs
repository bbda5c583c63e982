//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::UrlRecord;

/// Errors that can occur during cache operations.
///
/// A miss is not an error; see [`CacheLookup::Miss`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Outcome of a successful cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(UrlRecord),
    Miss,
}

impl CacheLookup {
    /// Converts the lookup into an `Option`, discarding the hit/miss distinction.
    pub fn into_record(self) -> Option<UrlRecord> {
        match self {
            CacheLookup::Hit(record) => Some(record),
            CacheLookup::Miss => None,
        }
    }
}

/// Fast cache of short code → URL record.
///
/// The cache is an optimization, not a dependency: callers recover from every
/// [`CacheError`] by going to the durable store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::InMemoryCache`] - in-process moka cache
/// - [`crate::infrastructure::cache::NullCache`] - no-op, always misses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlCache: Send + Sync {
    /// Looks up the cached record for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(CacheLookup::Hit(record))` when an entry is present
    /// - `Ok(CacheLookup::Miss)` when the code is definitely not cached
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] when the backend is unreachable, slow, or holds an
    /// undecodable payload.
    async fn get(&self, code: &str) -> CacheResult<CacheLookup>;

    /// Stores the whole record under `code`, replacing any previous entry and
    /// resetting its TTL.
    async fn set(&self, code: &str, record: &UrlRecord, ttl: Duration) -> CacheResult<()>;

    /// Removes a cached entry. Deleting an absent key succeeds.
    async fn delete(&self, code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
