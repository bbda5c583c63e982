//! Repository trait for API token authentication.

use crate::domain::entities::OwnerId;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token entity with metadata.
///
/// Tokens are stored as HMAC-SHA256 hashes; the raw value is never persisted.
/// Each token authenticates as exactly one owner.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    /// Returns true if the token has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to the owner it authenticates.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(owner_id))` if the token is valid and not revoked
    /// - `Ok(None)` if the token is unknown or revoked
    async fn validate_token(&self, token_hash: &str) -> Result<Option<OwnerId>, AppError>;

    /// Updates the `last_used_at` timestamp for a token.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError>;

    /// Creates a new API token for an owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or hash is already taken.
    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        owner_id: OwnerId,
    ) -> Result<ApiToken, AppError>;

    /// Lists all tokens, newest first.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Finds a token by its name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// Returns `Ok(true)` if a live token was revoked, `Ok(false)` if it was
    /// unknown or already revoked.
    async fn revoke_token(&self, id: i64) -> Result<bool, AppError>;
}
