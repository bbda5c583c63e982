//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewUrlRecord, OwnerId, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// In-process URL store using DashMap.
///
/// Insert uses the map's entry API, so check-and-insert of a code happens under
/// the shard lock and concurrent inserts of the same code cannot both succeed.
/// Expired records are kept: codes are never reissued.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    records: DashMap<String, UrlRecord>,
    next_id: AtomicI64,
}

impl InMemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fully formed record as-is, bypassing insert defaults.
    ///
    /// Useful for seeding records with a past `expires_at` or a non-zero click count.
    pub fn seed(&self, record: UrlRecord) {
        self.next_id.fetch_max(record.id, Ordering::SeqCst);
        self.records.insert(record.short_code.clone(), record);
    }

    /// Number of stored records, expired included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        match self.records.entry(new_record.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_record.short_code }),
            )),
            Entry::Vacant(slot) => {
                let record = UrlRecord {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    short_code: new_record.short_code,
                    original_url: new_record.original_url,
                    owner_id: new_record.owner_id,
                    click_count: 0,
                    created_at: Utc::now(),
                    expires_at: new_record.expires_at,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self
            .records
            .get(code)
            .filter(|r| !r.is_expired())
            .map(|r| r.value().clone()))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.records.contains_key(code))
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        match self.records.get_mut(code) {
            Some(mut record) => {
                record.click_count += 1;
                Ok(())
            }
            None => Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            )),
        }
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<UrlRecord>, AppError> {
        let mut records: Vec<UrlRecord> = self
            .records
            .iter()
            .filter(|r| r.owner_id == Some(owner_id))
            .map(|r| r.value().clone())
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
