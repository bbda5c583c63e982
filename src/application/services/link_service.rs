//! Short link creation, resolution and ownership-checked reads.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::code_generator::CodeGenerator;
use crate::application::services::url_resolver::UrlResolver;
use crate::domain::entities::{NewUrlRecord, OwnerId, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::UrlCache;
use crate::utils::code_generator::validate_custom_code;

/// Insert attempts for a generated code before giving up.
const MAX_GENERATED_INSERT_ATTEMPTS: usize = 3;

/// Input to [`LinkService::shorten`].
#[derive(Debug, Clone, Default)]
pub struct ShortenCommand {
    pub original_url: String,
    pub custom_code: Option<String>,
    pub owner_id: Option<OwnerId>,
    /// Lifetime in hours. Zero or absent means the link never expires.
    pub ttl_hours: Option<i64>,
}

/// Service for creating and reading shortened links.
///
/// Owns the code generator and the cache-aside resolver; both share the same
/// store handle.
pub struct LinkService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: CodeGenerator<R>,
    resolver: UrlResolver<R>,
}

impl<R: UrlRepository + ?Sized> LinkService<R> {
    /// Creates a new link service.
    ///
    /// `cache_ttl` applies to every record written to the cache.
    pub fn new(repository: Arc<R>, cache: Arc<dyn UrlCache>, cache_ttl: Duration) -> Self {
        Self {
            generator: CodeGenerator::new(repository.clone()),
            resolver: UrlResolver::new(repository.clone(), cache, cache_ttl),
            repository,
        }
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - A custom code is validated, pre-checked, then inserted. A duplicate at
    ///   insert time is reported as a conflict.
    /// - Otherwise a code is allocated. If another writer takes it between the
    ///   check and the insert, a new code is allocated, up to 3 inserts.
    ///
    /// The new record is written to the cache (best-effort).
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed custom code or an
    ///   unrepresentable lifetime
    /// - [`AppError::Conflict`] if the custom code is taken
    /// - [`AppError::Exhausted`] if no free generated code could be inserted
    pub async fn shorten(&self, command: ShortenCommand) -> Result<UrlRecord, AppError> {
        let expires_at = match command.ttl_hours.filter(|hours| *hours > 0) {
            Some(hours) => Some(expiry_after(hours)?),
            None => None,
        };

        let record = match command.custom_code {
            Some(custom) => {
                self.insert_custom(custom, command.original_url, command.owner_id, expires_at)
                    .await?
            }
            None => {
                self.insert_generated(command.original_url, command.owner_id, expires_at)
                    .await?
            }
        };

        tracing::info!("Created short link {}", record.short_code);
        self.resolver.populate(&record).await;
        Ok(record)
    }

    async fn insert_custom(
        &self,
        code: String,
        original_url: String,
        owner_id: Option<OwnerId>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<UrlRecord, AppError> {
        validate_custom_code(&code)?;

        if self.repository.exists(&code).await? {
            return Err(AppError::conflict(
                "Custom code already exists",
                json!({ "code": code }),
            ));
        }

        self.repository
            .insert(NewUrlRecord {
                short_code: code,
                original_url,
                owner_id,
                expires_at,
            })
            .await
    }

    async fn insert_generated(
        &self,
        original_url: String,
        owner_id: Option<OwnerId>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<UrlRecord, AppError> {
        for attempt in 1..=MAX_GENERATED_INSERT_ATTEMPTS {
            let code = self.generator.allocate_default().await?;

            let result = self
                .repository
                .insert(NewUrlRecord {
                    short_code: code.clone(),
                    original_url: original_url.clone(),
                    owner_id,
                    expires_at,
                })
                .await;

            match result {
                Err(AppError::Conflict { .. }) => {
                    metrics::counter!("code_collisions_total").increment(1);
                    tracing::warn!(
                        "Generated code {} was taken at insert (attempt {}/{})",
                        code,
                        attempt,
                        MAX_GENERATED_INSERT_ATTEMPTS
                    );
                }
                other => return other,
            }
        }

        Err(AppError::exhausted(
            "Unable to allocate a unique short code",
            json!({ "insert_attempts": MAX_GENERATED_INSERT_ATTEMPTS }),
        ))
    }

    /// Resolves a code for a redirect through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        self.resolver.resolve(code).await
    }

    /// Reads current stats for a code from the durable store.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown or expired
    /// - [`AppError::Forbidden`] if the link is owned by someone other than `requester`
    pub async fn get_stats(
        &self,
        code: &str,
        requester: Option<OwnerId>,
    ) -> Result<UrlRecord, AppError> {
        let record = self.resolver.resolve_fresh(code).await?;

        if !record.is_visible_to(requester) {
            return Err(AppError::forbidden(
                "You do not have access to this link",
                json!({ "code": code }),
            ));
        }

        Ok(record)
    }

    /// Lists every link of an owner, newest first, expired included.
    pub async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<UrlRecord>, AppError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Checks that the durable store answers.
    pub async fn ping_store(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

/// Constructs the full short URL from the public base URL and a code.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

/// Expiry instant `hours` from now.
fn expiry_after(hours: i64) -> Result<DateTime<Utc>, AppError> {
    ChronoDuration::try_hours(hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::bad_request(
                "Link lifetime is out of range",
                json!({ "expires_in_hrs": hours }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{CacheLookup, InMemoryCache, NullCache};
    use crate::infrastructure::persistence::InMemoryUrlRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(3600);

    fn command(custom_code: Option<&str>) -> ShortenCommand {
        ShortenCommand {
            original_url: "https://example.com/page".to_string(),
            custom_code: custom_code.map(str::to_string),
            ..Default::default()
        }
    }

    fn memory_service() -> (LinkService<InMemoryUrlRepository>, Arc<InMemoryUrlRepository>) {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let service = LinkService::new(repo.clone(), Arc::new(NullCache), TTL);
        (service, repo)
    }

    fn stored_record(code: &str, owner_id: Option<OwnerId>) -> UrlRecord {
        UrlRecord {
            id: 1,
            short_code: code.to_string(),
            original_url: "https://example.com/page".to_string(),
            owner_id,
            click_count: 3,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_shorten_generated_code() {
        let (service, repo) = memory_service();

        let record = service.shorten(command(None)).await.unwrap();

        assert_eq!(record.short_code.len(), 7);
        assert_eq!(record.original_url, "https://example.com/page");
        assert_eq!(record.expires_at, None);
        assert!(repo.exists(&record.short_code).await.unwrap());
    }

    #[tokio::test]
    async fn test_shorten_populates_cache() {
        let repo = Arc::new(InMemoryUrlRepository::new());
        let cache = Arc::new(InMemoryCache::new(100));
        let service = LinkService::new(repo, cache.clone(), TTL);

        let record = service.shorten(command(Some("cached1"))).await.unwrap();

        assert_eq!(
            cache.get("cached1").await.unwrap(),
            CacheLookup::Hit(record)
        );
    }

    #[tokio::test]
    async fn test_shorten_sets_expiry_from_ttl_hours() {
        let (service, _) = memory_service();

        let before = Utc::now();
        let record = service
            .shorten(ShortenCommand {
                ttl_hours: Some(2),
                ..command(None)
            })
            .await
            .unwrap();

        let expires_at = record.expires_at.unwrap();
        assert!(expires_at >= before + ChronoDuration::hours(2));
        assert!(expires_at <= Utc::now() + ChronoDuration::hours(2));
    }

    #[tokio::test]
    async fn test_shorten_rejects_unrepresentable_ttl() {
        let (service, repo) = memory_service();

        for hours in [10_000_000_000, i64::MAX] {
            let result = service
                .shorten(ShortenCommand {
                    ttl_hours: Some(hours),
                    ..command(None)
                })
                .await;

            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_shorten_zero_ttl_never_expires() {
        let (service, _) = memory_service();

        let record = service
            .shorten(ShortenCommand {
                ttl_hours: Some(0),
                ..command(None)
            })
            .await
            .unwrap();

        assert_eq!(record.expires_at, None);
    }

    #[tokio::test]
    async fn test_shorten_custom_code_boundaries() {
        let (service, repo) = memory_service();

        assert!(matches!(
            service.shorten(command(Some("abc"))).await,
            Err(AppError::Validation { .. })
        ));
        assert!(service.shorten(command(Some("abcd"))).await.is_ok());
        assert!(
            service
                .shorten(command(Some("abcdefghij0123456789")))
                .await
                .is_ok()
        );
        assert!(matches!(
            service.shorten(command(Some("abcdefghij0123456789x"))).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            service.shorten(command(Some("my-link"))).await,
            Err(AppError::Validation { .. })
        ));

        assert!(repo.exists("abcd").await.unwrap());
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_shorten_custom_code_taken() {
        let (service, _) = memory_service();
        service.shorten(command(Some("promo2025"))).await.unwrap();

        let result = service.shorten(command(Some("promo2025"))).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_shorten_custom_code_insert_race_surfaces_conflict() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_exists().times(1).returning(|_| Ok(false));
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);
        let result = service.shorten(command(Some("racer123"))).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_shorten_concurrent_same_custom_code() {
        let (service, _) = memory_service();
        let service = Arc::new(service);

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.shorten(command(Some("samecode"))).await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.shorten(command(Some("samecode"))).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict { .. })))
            .count();

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn test_shorten_generated_retries_insert_conflict() {
        let inserts = Arc::new(AtomicUsize::new(0));
        let counter = inserts.clone();

        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_exists().returning(|_| Ok(false));
        mock_repo.expect_insert().times(2).returning(move |new_record| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::conflict("Short code already exists", json!({})))
            } else {
                Ok(UrlRecord {
                    short_code: new_record.short_code,
                    ..stored_record("unused", None)
                })
            }
        });

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);
        let record = service.shorten(command(None)).await.unwrap();

        assert_eq!(record.short_code.len(), 7);
        assert_eq!(inserts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shorten_generated_exhausted_after_repeated_conflicts() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_exists().returning(|_| Ok(false));
        mock_repo
            .expect_insert()
            .times(MAX_GENERATED_INSERT_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);
        let result = service.shorten(command(None)).await;

        assert!(matches!(result, Err(AppError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn test_get_stats_anonymous_link_visible_to_anyone() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .returning(|code| Ok(Some(stored_record(code, None))));

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);

        assert_eq!(
            service.get_stats("abc1234", None).await.unwrap().click_count,
            3
        );
        assert!(service.get_stats("abc1234", Some(9)).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_stats_owned_link() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo
            .expect_get_by_code()
            .returning(|code| Ok(Some(stored_record(code, Some(1)))));

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);

        assert!(service.get_stats("abc1234", Some(1)).await.is_ok());
        assert!(matches!(
            service.get_stats("abc1234", Some(2)).await,
            Err(AppError::Forbidden { .. })
        ));
        assert!(matches!(
            service.get_stats("abc1234", None).await,
            Err(AppError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_stats_not_found() {
        let mut mock_repo = MockUrlRepository::new();
        mock_repo.expect_get_by_code().returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_repo), Arc::new(NullCache), TTL);

        assert!(matches!(
            service.get_stats("missing1", None).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_by_owner() {
        let (service, _) = memory_service();
        service
            .shorten(ShortenCommand {
                owner_id: Some(5),
                ..command(Some("mine1234"))
            })
            .await
            .unwrap();
        service.shorten(command(Some("anon1234"))).await.unwrap();

        let records = service.list_by_owner(5).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].short_code, "mine1234");
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            short_url("http://localhost:8080/", "abc1234"),
            "http://localhost:8080/abc1234"
        );
        assert_eq!(
            short_url("https://s.example.com", "x1y2"),
            "https://s.example.com/x1y2"
        );
    }
}
