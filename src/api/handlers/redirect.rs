//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache, falling back to the database
/// 2. Queue a click event for the background worker
/// 3. Return 307 Temporary Redirect
///
/// The click is queued with `try_send`, so a full queue drops the click rather
/// than delaying the redirect.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist or has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.link_service.resolve(&code).await?;

    state.click_accounting.record(&record.short_code);

    Ok(Redirect::temporary(&record.original_url))
}
