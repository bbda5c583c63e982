//! Cache-aside resolution of short codes.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheLookup, UrlCache};

/// Resolves short codes through the fast cache, falling back to the durable store.
///
/// # Read path
///
/// 1. Cache hit with a live record: returned without touching the store
/// 2. Cache hit with an expired record: evicted, then handled as a miss
/// 3. Miss or cache error: store lookup, then the record is written back
///
/// Cache failures never fail a resolve. They are logged and the store answers.
pub struct UrlResolver<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn UrlCache>,
    cache_ttl: Duration,
}

impl<R: UrlRepository + ?Sized> UrlResolver<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn UrlCache>, cache_ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            cache_ttl,
        }
    }

    /// Resolves a code for a redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    /// Store errors are propagated.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        match self.cache.get(code).await {
            Ok(CacheLookup::Hit(record)) if !record.is_expired() => {
                metrics::counter!("cache_lookups_total", "result" => "hit").increment(1);
                tracing::debug!("Cache hit for {}", code);
                return Ok(record);
            }
            Ok(CacheLookup::Hit(_)) => {
                metrics::counter!("cache_lookups_total", "result" => "expired").increment(1);
                tracing::debug!("Cached record for {} has expired, evicting", code);
                if let Err(e) = self.cache.delete(code).await {
                    tracing::warn!("Failed to evict expired cache entry {}: {}", code, e);
                }
            }
            Ok(CacheLookup::Miss) => {
                metrics::counter!("cache_lookups_total", "result" => "miss").increment(1);
                tracing::debug!("Cache miss for {}", code);
            }
            Err(e) => {
                metrics::counter!("cache_lookups_total", "result" => "error").increment(1);
                tracing::warn!("Cache lookup failed for {}, using store: {}", code, e);
            }
        }

        let record = self.resolve_fresh(code).await?;
        self.populate(&record).await;
        Ok(record)
    }

    /// Reads a live record straight from the durable store, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    pub async fn resolve_fresh(&self, code: &str) -> Result<UrlRecord, AppError> {
        self.repository
            .get_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Writes a record into the cache. Failures are logged and swallowed.
    pub async fn populate(&self, record: &UrlRecord) {
        if let Err(e) = self
            .cache
            .set(&record.short_code, record, self.cache_ttl)
            .await
        {
            tracing::warn!("Failed to cache {}: {}", record.short_code, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{CacheError, InMemoryCache, MockUrlCache};
    use chrono::{Duration as ChronoDuration, Utc};

    const TTL: Duration = Duration::from_secs(3600);

    fn record(code: &str, expires_in: Option<ChronoDuration>) -> UrlRecord {
        UrlRecord {
            id: 1,
            short_code: code.to_string(),
            original_url: "https://example.com/target".to_string(),
            owner_id: None,
            click_count: 0,
            created_at: Utc::now(),
            expires_at: expires_in.map(|d| Utc::now() + d),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_skips_store() {
        let stored = record("abc1234", None);
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let cache = Arc::new(InMemoryCache::new(100));
        let resolver = UrlResolver::new(Arc::new(mock_repo), cache.clone(), TTL);

        let first = resolver.resolve("abc1234").await.unwrap();
        let second = resolver.resolve("abc1234").await.unwrap();

        assert_eq!(first.original_url, "https://example.com/target");
        assert_eq!(second, first);
        assert!(matches!(
            cache.get("abc1234").await.unwrap(),
            CacheLookup::Hit(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_code_not_found() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let cache = Arc::new(InMemoryCache::new(100));
        let resolver = UrlResolver::new(Arc::new(mock_repo), cache.clone(), TTL);

        let result = resolver.resolve("missing1").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(cache.get("missing1").await.unwrap(), CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_expired_cache_hit_is_evicted_and_falls_through() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .times(1)
            .returning(|_| Ok(None));

        let cache = Arc::new(InMemoryCache::new(100));
        cache
            .set("old1234", &record("old1234", Some(ChronoDuration::hours(-1))), TTL)
            .await
            .unwrap();

        let resolver = UrlResolver::new(Arc::new(mock_repo), cache.clone(), TTL);
        let result = resolver.resolve("old1234").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(cache.get("old1234").await.unwrap(), CacheLookup::Miss);
    }

    #[tokio::test]
    async fn test_expired_in_store_is_not_found() {
        let mut mock_repo = MockUrlRepository::new();
        // The store filters expired rows itself.
        mock_repo.expect_get_by_code().returning(|_| Ok(None));

        let resolver = UrlResolver::new(
            Arc::new(mock_repo),
            Arc::new(InMemoryCache::new(100)),
            TTL,
        );

        assert!(matches!(
            resolver.resolve("gone123").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_error_falls_through_to_store() {
        let stored = record("abc1234", None);
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let mut mock_cache = MockUrlCache::new();
        mock_cache
            .expect_get()
            .times(1)
            .returning(|_| Err(CacheError::Timeout(Duration::from_millis(1000))));
        mock_cache
            .expect_set()
            .times(1)
            .returning(|_, _, _| Err(CacheError::ConnectionError("down".to_string())));

        let resolver = UrlResolver::new(Arc::new(mock_repo), Arc::new(mock_cache), TTL);
        let result = resolver.resolve("abc1234").await;

        assert_eq!(result.unwrap().short_code, "abc1234");
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .returning(|_| Err(AppError::unavailable("Database query timed out", json!({}))));

        let resolver = UrlResolver::new(
            Arc::new(mock_repo),
            Arc::new(InMemoryCache::new(100)),
            TTL,
        );

        assert!(matches!(
            resolver.resolve("abc1234").await,
            Err(AppError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_fresh_bypasses_cache() {
        let stored = record("abc1234", None);
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));

        let mut mock_cache = MockUrlCache::new();
        mock_cache.expect_get().times(0);
        mock_cache.expect_set().times(0);

        let resolver = UrlResolver::new(Arc::new(mock_repo), Arc::new(mock_cache), TTL);

        resolver.resolve_fresh("abc1234").await.unwrap();
        resolver.resolve_fresh("abc1234").await.unwrap();
    }
}
