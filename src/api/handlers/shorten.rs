//! Handler for link shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::Identity;
use crate::application::services::link_service::short_url;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// A valid Bearer token makes the caller the owner of the new link; without
/// one the link is anonymous.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "custom_code": "Promo2025",   // optional
///   "expires_in_hrs": 24          // optional, 0 = never
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "Promo2025",
///   "short_url": "http://localhost:8080/Promo2025",
///   "original_url": "https://example.com/some/long/path",
///   "expires_at": "2026-01-02T10:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400` for an invalid URL or custom code
/// - `409` if the custom code is taken
/// - `503` if no free code could be allocated or the store is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let owner_id = identity.map(|Extension(Identity(owner_id))| owner_id);
    let record = state
        .link_service
        .shorten(payload.into_command(owner_id))
        .await?;

    let short_url = short_url(&state.base_url, &record.short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::from_record(record, short_url)),
    ))
}
