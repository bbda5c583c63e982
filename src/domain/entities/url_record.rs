//! URL record entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identity of the caller that owns a link.
pub type OwnerId = i64;

/// A stored short code → URL mapping.
///
/// The same shape is written to the cache, so `expires_at` travels with every
/// cached copy and can be re-checked on each hit. `click_count` in a cached copy
/// is approximate; only the durable store holds the authoritative value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub owner_id: Option<OwnerId>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// Returns true if the record has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if `requester` may read this record's statistics.
    ///
    /// Anonymous records are visible to anyone; owned records only to their owner.
    pub fn is_visible_to(&self, requester: Option<OwnerId>) -> bool {
        match self.owner_id {
            None => true,
            Some(owner) => requester == Some(owner),
        }
    }
}

/// Input data for creating a new URL record.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub owner_id: Option<OwnerId>,
    pub expires_at: Option<DateTime<Utc>>,
}
