//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::OwnerId;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Hashes a raw token with HMAC-SHA256 keyed by `signing_secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC. Shared by the server and
/// the admin CLI so both derive the same stored hash.
pub fn hash_token(signing_secret: &str, token: &str) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts any key length"),
    };
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns the owner it belongs to.
    ///
    /// On success, updates the `last_used_at` timestamp (best-effort).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Store errors are propagated.
    pub async fn authenticate(&self, token: &str) -> Result<OwnerId, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(owner_id) = self.repository.validate_token(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!("Failed to update token last_used_at: {}", e);
        }

        Ok(owner_id)
    }

    /// Resolves an optional caller identity.
    ///
    /// Invalid tokens and store failures both yield an anonymous caller.
    pub async fn identify(&self, token: &str) -> Option<OwnerId> {
        match self.authenticate(token).await {
            Ok(owner_id) => Some(owner_id),
            Err(AppError::Unauthorized { .. }) => None,
            Err(e) => {
                tracing::warn!("Token lookup failed, treating caller as anonymous: {}", e);
                None
            }
        }
    }
}
