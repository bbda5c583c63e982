//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Database and click queue healthy (cache may be degraded)
/// - **503 Service Unavailable**: Database or click queue failing
///
/// The cache is an optimization, so a failing cache marks the service
/// `degraded` without failing the check.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok" },
///     "click_queue": { "status": "ok", "message": "9998/10000 slots free" },
///     "cache": { "status": "ok" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let queue_check = check_click_queue(&state);
    let cache_check = check_cache(&state).await;

    let core_healthy = db_check.is_ok() && queue_check.is_ok();
    let status = match (core_healthy, cache_check.is_ok()) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        (false, _) => "unhealthy",
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            click_queue: queue_check,
            cache: cache_check,
        },
    };

    if core_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_service.ping_store().await {
        Ok(()) => CheckStatus::ok(None),
        Err(e) => {
            tracing::error!("Health check: database unreachable: {}", e);
            CheckStatus::error(format!("Database error: {}", e))
        }
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    let queue = &state.click_accounting;
    if !queue.is_running() {
        return CheckStatus::error("Click queue is closed");
    }

    CheckStatus::ok(Some(format!(
        "{}/{} slots free",
        queue.available_capacity(),
        queue.max_capacity()
    )))
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::ok(None)
    } else {
        CheckStatus::error("Cache backend unreachable")
    }
}
