//! DTOs for link statistics and owner listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::link_service::short_url;
use crate::domain::entities::{OwnerId, UrlRecord};

/// Current state of a short link, including its click count.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlStatsResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<OwnerId>,

    pub click_count: i64,
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlStatsResponse {
    pub fn from_record(record: UrlRecord, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &record.short_code),
            id: record.id,
            short_code: record.short_code,
            original_url: record.original_url,
            owner_id: record.owner_id,
            click_count: record.click_count,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// Every link owned by the caller, newest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct MyUrlsResponse {
    pub count: usize,
    pub urls: Vec<UrlStatsResponse>,
}

impl MyUrlsResponse {
    pub fn from_records(records: Vec<UrlRecord>, base_url: &str) -> Self {
        let urls: Vec<_> = records
            .into_iter()
            .map(|record| UrlStatsResponse::from_record(record, base_url))
            .collect();

        Self {
            count: urls.len(),
            urls,
        }
    }
}
