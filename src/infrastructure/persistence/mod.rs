//! Repository implementations.
//!
//! Concrete implementations of domain repository traits.
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL URL store
//! - [`PgTokenRepository`] - API token storage and validation
//! - [`InMemoryUrlRepository`] - DashMap-backed URL store for tests and local runs

pub mod memory_url_repository;
pub mod pg_token_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_url_repository::PgUrlRepository;
