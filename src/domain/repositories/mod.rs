//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the durable store and the identity collaborator.
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Short code → URL records and click counters
//! - [`TokenRepository`] - API tokens bound to owner identities

pub mod token_repository;
pub mod url_repository;

pub use token_repository::{ApiToken, TokenRepository};
pub use url_repository::UrlRepository;

#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
