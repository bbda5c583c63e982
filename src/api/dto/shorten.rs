//! DTOs for the link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::application::services::ShortenCommand;
use crate::domain::entities::{OwnerId, UrlRecord};

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Request to shorten a single URL.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,

    /// Optional custom short code. An empty string is treated as absent.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(min = 4, max = 20, message = "Custom code must be 4-20 characters"))]
    #[validate(regex(
        path = "*CUSTOM_CODE_REGEX",
        message = "Custom code can only contain letters and digits"
    ))]
    pub custom_code: Option<String>,

    /// Optional lifetime in hours, at most ten years. Zero or absent means the
    /// link never expires.
    #[validate(range(min = 0, max = 87600))]
    pub expires_in_hrs: Option<i64>,
}

impl ShortenRequest {
    /// Converts the request into a service command for the given caller.
    pub fn into_command(self, owner_id: Option<OwnerId>) -> ShortenCommand {
        ShortenCommand {
            original_url: self.url,
            custom_code: self.custom_code,
            owner_id,
            ttl_hours: self.expires_in_hrs,
        }
    }
}

/// Accepts absolute `http` and `https` URLs with a host.
fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value).map_err(|_| {
        ValidationError::new("url").with_message("Invalid URL format".into())
    })?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ValidationError::new("url")
            .with_message("URL must use http or https and include a host".into()));
    }

    Ok(())
}

/// Response for a newly created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn from_record(record: UrlRecord, short_url: String) -> Self {
        Self {
            short_code: record.short_code,
            short_url,
            original_url: record.original_url,
            expires_at: record.expires_at,
        }
    }
}
