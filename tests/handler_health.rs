mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use linkcut::domain::entities::UrlRecord;
use linkcut::infrastructure::cache::{CacheError, CacheLookup, CacheResult, UrlCache};
use std::sync::Arc;
use std::time::Duration;

/// Cache whose backend is always unreachable.
struct UnreachableCache;

#[async_trait]
impl UrlCache for UnreachableCache {
    async fn get(&self, _code: &str) -> CacheResult<CacheLookup> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set(&self, _code: &str, _record: &UrlRecord, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn delete(&self, _code: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::spawn_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_queue_capacity() {
    let app = common::spawn_app();

    let response = app.server.get("/health").await;

    let json = response.json::<serde_json::Value>();
    assert!(
        json["checks"]["click_queue"]["message"]
            .as_str()
            .unwrap()
            .ends_with("/100 slots free")
    );
}

#[tokio::test]
async fn test_health_cache_failure_is_degraded() {
    let app = common::spawn_app_with_cache(Arc::new(UnreachableCache));

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_service_works_without_cache() {
    let app = common::spawn_app_with_cache(Arc::new(UnreachableCache));

    let code = common::shorten(&app.server, "https://example.com/no-cache").await;

    let response = app.server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/no-cache");
    assert_eq!(app.urls.lookups(), 1);
}
