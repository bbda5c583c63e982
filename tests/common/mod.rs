#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use linkcut::application::services::auth_service::hash_token;
use linkcut::application::services::{
    AuthService, ClickAccounting, ClickRecorder, LinkService, run_click_worker,
};
use linkcut::domain::entities::{NewUrlRecord, OwnerId, UrlRecord};
use linkcut::domain::repositories::{ApiToken, TokenRepository, UrlRepository};
use linkcut::error::AppError;
use linkcut::infrastructure::cache::{InMemoryCache, UrlCache};
use linkcut::infrastructure::persistence::InMemoryUrlRepository;
use linkcut::routes::service_router;
use linkcut::state::AppState;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "http://localhost:8080";
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Token store keyed by hash.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: DashMap<String, ApiToken>,
    next_id: AtomicI64,
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn validate_token(&self, token_hash: &str) -> Result<Option<OwnerId>, AppError> {
        Ok(self
            .tokens
            .get(token_hash)
            .filter(|t| !t.is_revoked())
            .map(|t| t.owner_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        if let Some(mut token) = self.tokens.get_mut(token_hash) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        owner_id: OwnerId,
    ) -> Result<ApiToken, AppError> {
        let token = ApiToken {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            owner_id,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        self.tokens.insert(token_hash.to_string(), token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tokens.iter().map(|t| t.value().clone()).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value().clone()))
    }

    async fn revoke_token(&self, id: i64) -> Result<bool, AppError> {
        for mut token in self.tokens.iter_mut() {
            if token.id == id && token.revoked_at.is_none() {
                token.revoked_at = Some(Utc::now());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// URL store wrapper that counts reads reaching the store.
#[derive(Default)]
pub struct SpyUrlRepository {
    pub inner: InMemoryUrlRepository,
    pub lookups: AtomicUsize,
}

impl SpyUrlRepository {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrlRepository for SpyUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        self.inner.insert(new_record).await
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_code(code).await
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        self.inner.exists(code).await
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        self.inner.increment_clicks(code).await
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<UrlRecord>, AppError> {
        self.inner.list_by_owner(owner_id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

/// In-memory service stack behind a test server.
pub struct TestApp {
    pub server: TestServer,
    pub urls: Arc<SpyUrlRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub cache: Arc<dyn UrlCache>,
    pub state: AppState,
}

impl TestApp {
    /// Registers a token for `owner_id` and returns the raw value.
    pub async fn token_for(&self, owner_id: OwnerId) -> String {
        let raw = format!("token-for-{owner_id}");
        self.tokens
            .create_token(&raw, &hash_token(SIGNING_SECRET, &raw), owner_id)
            .await
            .unwrap();
        raw
    }

    /// Seeds a record that expired an hour ago.
    pub fn seed_expired(&self, code: &str, url: &str) {
        self.urls.inner.seed(UrlRecord {
            id: 1000,
            short_code: code.to_string(),
            original_url: url.to_string(),
            owner_id: None,
            click_count: 0,
            created_at: Utc::now() - ChronoDuration::hours(2),
            expires_at: Some(Utc::now() - ChronoDuration::hours(1)),
        });
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_cache(Arc::new(InMemoryCache::new(1_000)))
}

pub fn spawn_app_with_cache(cache: Arc<dyn UrlCache>) -> TestApp {
    let urls = Arc::new(SpyUrlRepository::default());
    let tokens = Arc::new(InMemoryTokenRepository::default());

    let url_repository: Arc<dyn UrlRepository> = urls.clone();
    let token_repository: Arc<dyn TokenRepository> = tokens.clone();

    let (click_accounting, click_rx) = ClickAccounting::channel(100);
    let recorder = Arc::new(ClickRecorder::new(
        url_repository.clone(),
        cache.clone(),
        CACHE_TTL,
    ));
    tokio::spawn(run_click_worker(click_rx, recorder, 4));

    let state = AppState::new(
        Arc::new(LinkService::new(url_repository, cache.clone(), CACHE_TTL)),
        Arc::new(AuthService::new(
            token_repository,
            SIGNING_SECRET.to_string(),
        )),
        cache.clone(),
        click_accounting,
        BASE_URL.to_string(),
    );

    let server = TestServer::new(service_router(state.clone())).unwrap();

    TestApp {
        server,
        urls,
        tokens,
        cache,
        state,
    }
}

/// Shortens `url` anonymously and returns the short code.
pub async fn shorten(server: &TestServer, url: &str) -> String {
    let response = server.post("/api/shorten").json(&json!({ "url": url })).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string()
}
