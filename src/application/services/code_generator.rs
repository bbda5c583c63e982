//! Collision-resolving short code allocation.

use serde_json::json;
use std::sync::Arc;

use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::{MAX_CODE_LENGTH, MIN_CODE_LENGTH, random_code};

/// Starting length for generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Candidates tried at one length before growing by a character.
pub const ATTEMPTS_PER_LENGTH: usize = 5;

/// Allocates short codes that are free in the durable store.
///
/// Each candidate is checked with [`UrlRepository::exists`], which also sees
/// expired records, so a code is never handed out twice. When every attempt at
/// a length collides the generator grows the code by one character, up to
/// [`MAX_CODE_LENGTH`].
///
/// The check is advisory: two allocations may race to the same code and the
/// store's unique constraint decides at insert time.
pub struct CodeGenerator<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UrlRepository + ?Sized> CodeGenerator<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Allocates a code of [`DEFAULT_CODE_LENGTH`] or longer.
    pub async fn allocate_default(&self) -> Result<String, AppError> {
        self.allocate(DEFAULT_CODE_LENGTH).await
    }

    /// Allocates a free code of at least `requested_length` characters.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `requested_length` is outside 4-20
    /// - [`AppError::Exhausted`] if every attempt up to [`MAX_CODE_LENGTH`] collided
    /// - [`AppError::Internal`] if the random source fails
    /// - store errors from `exists` are propagated unchanged
    pub async fn allocate(&self, requested_length: usize) -> Result<String, AppError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&requested_length) {
            return Err(AppError::bad_request(
                "Code length must be between 4 and 20",
                json!({ "requested_length": requested_length }),
            ));
        }

        let mut length = requested_length;
        loop {
            for _ in 0..ATTEMPTS_PER_LENGTH {
                let candidate = random_code(length).map_err(|e| {
                    tracing::error!("Random source failure: {}", e);
                    AppError::internal(
                        "Failed to generate short code",
                        json!({ "reason": e.to_string() }),
                    )
                })?;

                if !self.repository.exists(&candidate).await? {
                    return Ok(candidate);
                }

                metrics::counter!("code_collisions_total").increment(1);
                tracing::debug!("Code collision at length {}", length);
            }

            if length == MAX_CODE_LENGTH {
                break;
            }

            length += 1;
            metrics::counter!("code_length_growth_total").increment(1);
            tracing::warn!(
                "All {} attempts collided, growing code length to {}",
                ATTEMPTS_PER_LENGTH,
                length
            );
        }

        tracing::error!(
            "Code space exhausted from length {} to {}",
            requested_length,
            MAX_CODE_LENGTH
        );
        Err(AppError::exhausted(
            "Unable to allocate a unique short code",
            json!({
                "requested_length": requested_length,
                "max_length": MAX_CODE_LENGTH,
            }),
        ))
    }
}
