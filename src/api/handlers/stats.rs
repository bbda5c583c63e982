//! Handlers for link statistics and owner listings.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::stats::{MyUrlsResponse, UrlStatsResponse};
use crate::api::middleware::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the current record and click count of a short link.
///
/// # Endpoint
///
/// `GET /api/url/{code}/stats`
///
/// Reads from the database, never the cache. Links created anonymously are
/// visible to everyone; owned links only to their owner.
///
/// # Errors
///
/// - `403` if the link belongs to another owner or the caller is anonymous
/// - `404` if the code doesn't exist or has expired
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<UrlStatsResponse>, AppError> {
    let requester = identity.map(|Extension(Identity(owner_id))| owner_id);

    let record = state.link_service.get_stats(&code, requester).await?;

    Ok(Json(UrlStatsResponse::from_record(record, &state.base_url)))
}

/// Lists every link owned by the authenticated caller, newest first.
///
/// # Endpoint
///
/// `GET /api/my-urls`
///
/// Expired links are included.
pub async fn my_urls_handler(
    State(state): State<AppState>,
    Extension(Identity(owner_id)): Extension<Identity>,
) -> Result<Json<MyUrlsResponse>, AppError> {
    let records = state.link_service.list_by_owner(owner_id).await?;

    Ok(Json(MyUrlsResponse::from_records(records, &state.base_url)))
}
