//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{NewUrlRecord, OwnerId, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

#[derive(Debug, FromRow)]
struct UrlRow {
    id: i64,
    short_code: String,
    original_url: String,
    owner_id: Option<i64>,
    clicks: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord {
            id: row.id,
            short_code: row.short_code,
            original_url: row.original_url,
            owner_id: row.owner_id,
            click_count: row.clicks,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// PostgreSQL repository for URL records.
///
/// Uniqueness is enforced by the `urls_short_code_key` constraint and click
/// increments are a single `UPDATE ... SET clicks = clicks + 1`. Every query is
/// bounded by `query_timeout`.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                tracing::error!("Database query timed out after {:?}", self.query_timeout);
                Err(AppError::unavailable(
                    "Database query timed out",
                    json!({ "timeout_ms": self.query_timeout.as_millis() as u64 }),
                ))
            }
        }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let row = self
            .bounded(
                sqlx::query_as::<_, UrlRow>(
                    r#"
            INSERT INTO urls (short_code, original_url, owner_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, short_code, original_url, owner_id, clicks, created_at, expires_at
            "#,
                )
                .bind(&new_record.short_code)
                .bind(&new_record.original_url)
                .bind(new_record.owner_id)
                .bind(new_record.expires_at)
                .fetch_one(self.pool.as_ref()),
            )
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(
                    "Short code already exists",
                    json!({ "code": new_record.short_code }),
                ),
                other => other,
            })?;

        Ok(row.into())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = self
            .bounded(
                sqlx::query_as::<_, UrlRow>(
                    r#"
            SELECT id, short_code, original_url, owner_id, clicks, created_at, expires_at
            FROM urls
            WHERE short_code = $1
              AND (expires_at IS NULL OR expires_at > NOW())
            "#,
                )
                .bind(code)
                .fetch_optional(self.pool.as_ref()),
            )
            .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        self.bounded(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref()),
        )
        .await
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        let result = self
            .bounded(
                sqlx::query("UPDATE urls SET clicks = clicks + 1 WHERE short_code = $1")
                    .bind(code)
                    .execute(self.pool.as_ref()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        Ok(())
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<UrlRecord>, AppError> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, UrlRow>(
                    r#"
            SELECT id, short_code, original_url, owner_id, clicks, created_at, expires_at
            FROM urls
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
                )
                .bind(owner_id)
                .fetch_all(self.pool.as_ref()),
            )
            .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.bounded(sqlx::query("SELECT 1").execute(self.pool.as_ref()))
            .await
            .map(|_| ())
    }
}
