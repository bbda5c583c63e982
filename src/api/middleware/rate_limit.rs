//! Rate limiting middleware using token bucket algorithm.
//!
//! Each limiter comes in two flavours. The plain one keys buckets on the socket
//! peer address. The `proxy_` one reads `X-Forwarded-For`, `X-Real-IP` and
//! `Forwarded` first and must only be used behind a trusted reverse proxy.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

type RateLimitLayer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build<K: KeyExtractor>(key_extractor: K, per_second: u64, burst: u32) -> RateLimitLayer<K> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates a rate limiter for public endpoints.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/{code}", get(redirect_handler))
///     .layer(rate_limit::layer());
/// ```
pub fn layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, 2, 100)
}

/// [`layer`] keyed on forwarded client IP headers.
pub fn proxy_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, 2, 100)
}

/// Creates a stricter rate limiter for API endpoints.
///
/// # Limits
///
/// - **Rate**: 1 request per second
/// - **Burst**: 10 requests
pub fn secure_layer() -> RateLimitLayer<PeerIpKeyExtractor> {
    build(PeerIpKeyExtractor, 1, 10)
}

/// [`secure_layer`] keyed on forwarded client IP headers.
pub fn proxy_secure_layer() -> RateLimitLayer<SmartIpKeyExtractor> {
    build(SmartIpKeyExtractor, 1, 10)
}
