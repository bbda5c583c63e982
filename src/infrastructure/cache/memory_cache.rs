//! In-process cache backed by moka.

use super::service::{CacheLookup, CacheResult, UrlCache};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedEntry {
    record: UrlRecord,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with; rewrites restart the clock.
struct PerEntryTtl;

impl Expiry<String, CachedEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory URL cache.
///
/// Used when Redis is not configured or unreachable at startup, and in tests.
/// Suitable for single-node deployments only: instances do not share entries.
#[derive(Clone)]
pub struct InMemoryCache {
    cache: Cache<String, CachedEntry>,
}

impl InMemoryCache {
    /// Creates a cache holding at most `max_capacity` records.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of live entries (approximate, for diagnostics and tests).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl UrlCache for InMemoryCache {
    async fn get(&self, code: &str) -> CacheResult<CacheLookup> {
        match self.cache.get(code).await {
            Some(entry) => {
                debug!("Cache HIT: {}", code);
                Ok(CacheLookup::Hit(entry.record))
            }
            None => {
                debug!("Cache MISS: {}", code);
                Ok(CacheLookup::Miss)
            }
        }
    }

    async fn set(&self, code: &str, record: &UrlRecord, ttl: Duration) -> CacheResult<()> {
        let entry = CachedEntry {
            record: record.clone(),
            ttl,
        };
        self.cache.insert(code.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, code: &str) -> CacheResult<()> {
        self.cache.invalidate(code).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
