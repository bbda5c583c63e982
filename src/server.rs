//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::application::services::{
    AuthService, ClickAccounting, ClickRecorder, LinkService, run_click_worker,
};
use crate::config::Config;
use crate::domain::repositories::{TokenRepository, UrlRepository};
use crate::infrastructure::cache::{InMemoryCache, NullCache, RedisCache, UrlCache};
use crate::infrastructure::persistence::{PgTokenRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// How long the click worker may keep draining after the server stops.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retry)
/// - Apply migrations
/// - URL cache (Redis, in-process, or disabled)
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after all retries
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let cache = build_cache(&config).await;

    let pool = Arc::new(pool);
    let url_repository: Arc<dyn UrlRepository> =
        Arc::new(PgUrlRepository::new(pool.clone(), config.db_query_timeout()));
    let token_repository: Arc<dyn TokenRepository> =
        Arc::new(PgTokenRepository::new(pool.clone()));

    let (click_accounting, click_rx) = ClickAccounting::channel(config.click_queue_capacity);
    let recorder = Arc::new(ClickRecorder::new(
        url_repository.clone(),
        cache.clone(),
        config.cache_ttl(),
    ));
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        recorder,
        config.click_worker_concurrency,
    ));

    let link_service = Arc::new(LinkService::new(
        url_repository,
        cache.clone(),
        config.cache_ttl(),
    ));
    let auth_service = Arc::new(AuthService::new(
        token_repository,
        config.token_signing_secret.clone(),
    ));

    let state = AppState::new(
        link_service,
        auth_service,
        cache,
        click_accounting,
        config.base_url.clone(),
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router and its click sender are gone; let the worker finish the queue.
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::error!("Click worker panicked: {}", e),
        Err(_) => tracing::warn!(
            "Click queue not drained within {:?}, remaining clicks are lost",
            CLICK_DRAIN_TIMEOUT
        ),
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Connects to PostgreSQL, retrying with exponential backoff.
///
/// Five retries at roughly 0.5s, 1s, 2s, 4s and 8s (jittered) cover a database
/// container that starts alongside the service.
async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(5);

    Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options
                .connect(&config.database_url)
                .await
                .inspect_err(|e| tracing::warn!("Database connection attempt failed: {}", e))
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Picks the cache backend.
///
/// - `CACHE_DISABLED` set: [`NullCache`]
/// - Redis configured and reachable: [`RedisCache`]
/// - Otherwise: [`InMemoryCache`]
async fn build_cache(config: &Config) -> Arc<dyn UrlCache> {
    if config.cache_disabled {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    }

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_timeout()).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-process cache.",
                    e
                );
            }
        }
    }

    tracing::info!(
        "Cache enabled (in-process, {} entries)",
        config.cache_capacity
    );
    Arc::new(InMemoryCache::new(config.cache_capacity))
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
