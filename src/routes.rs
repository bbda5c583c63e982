//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`                - Short link redirect (public)
//! - `GET  /health`                - Health check: DB, cache, click queue (public)
//! - `POST /api/shorten`           - Create a short URL (optional Bearer token)
//! - `GET  /api/url/{code}/stats`  - Link stats (optional Bearer token)
//! - `GET  /api/my-urls`           - Caller's links (Bearer token required)
//! - `GET  /api/profile`           - Caller's identity (Bearer token required)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, `Authorization` and `Content-Type` headers
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer token, optional or required per route group
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, cors, rate_limit, tracing as trace};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Public and API route groups with authentication attached, state not yet applied.
fn route_groups(state: &AppState) -> (Router<AppState>, Router<AppState>) {
    let public = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler));

    let api = api::routes::identified_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_identity,
        ))
        .merge(
            api::routes::protected_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_identity,
            )),
        );

    (public, api)
}

/// Routes and authentication without rate limiting or connection info.
///
/// Used by integration tests and embedders that apply their own limits.
pub fn service_router(state: AppState) -> Router {
    let (public, api) = route_groups(&state);

    Router::new()
        .merge(public)
        .nest("/api", api)
        .with_state(state)
        .layer(cors::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// The server must be run with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the rate limiter
/// can read the peer address.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let (public, api) = route_groups(&state);

    let (public, api) = if behind_proxy {
        (
            public.layer(rate_limit::proxy_layer()),
            api.layer(rate_limit::proxy_secure_layer()),
        )
    } else {
        (
            public.layer(rate_limit::layer()),
            api.layer(rate_limit::secure_layer()),
        )
    };

    let router = Router::new()
        .merge(public)
        .nest("/api", api)
        .with_state(state)
        .layer(cors::layer())
        .layer(trace::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
