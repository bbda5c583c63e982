//! Repository trait for the durable URL store.

use crate::domain::entities::{NewUrlRecord, OwnerId, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable source of truth for URL records.
///
/// The store owns short-code uniqueness and atomic click increments; callers
/// never lock around these operations.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record with a zero click count.
    ///
    /// This is the uniqueness-enforcing write: it must fail atomically if the
    /// short code was ever used, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached in time.
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds a resolvable (non-expired) record by short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if found and not expired
    /// - `Ok(None)` if absent or expired
    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Returns true if the short code was ever assigned, expired records included.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically adds one to the record's click counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this code.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Lists every record of an owner, newest first, expired ones included.
    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<UrlRecord>, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
