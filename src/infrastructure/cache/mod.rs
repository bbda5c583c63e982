//! Caching layer for fast redirect lookups.
//!
//! Provides a [`UrlCache`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`InMemoryCache`] - In-process moka cache for single-node deployments
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::InMemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheLookup, CacheResult, UrlCache};

#[cfg(test)]
pub use service::MockUrlCache;
