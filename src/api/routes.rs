//! API route configuration.
//!
//! Routes are grouped by how they authenticate; the caller applies the auth
//! layer so the groups can be reused with or without rate limiting.

use crate::api::handlers::{my_urls_handler, profile_handler, shorten_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that accept anonymous callers and attribute requests with a valid
/// Bearer token to its owner.
///
/// # Endpoints
///
/// - `POST /shorten`            - Create a short URL
/// - `GET  /url/{code}/stats`   - Current record and click count
pub fn identified_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/url/{code}/stats", get(stats_handler))
}

/// Routes that require a valid Bearer token.
///
/// # Endpoints
///
/// - `GET /my-urls` - Links owned by the caller
/// - `GET /profile` - The caller's identity
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/my-urls", get(my_urls_handler))
        .route("/profile", get(profile_handler))
}
