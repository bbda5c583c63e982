//! No-op cache implementation for disabled caching.

use super::service::{CacheLookup, CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup misses and every write succeeds without storing anything, so
/// all reads go to the durable store.
///
/// # Use Cases
///
/// - `CACHE_DISABLED=true`
/// - Tests that must observe every durable read
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for NullCache {
    async fn get(&self, _code: &str) -> CacheResult<CacheLookup> {
        Ok(CacheLookup::Miss)
    }

    async fn set(&self, _code: &str, _record: &UrlRecord, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
