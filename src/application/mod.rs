//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls, validation, and business rules. Services consume the domain
//! traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shortening, resolution, stats and listing
//! - [`services::code_generator::CodeGenerator`] - Collision-resolving code allocation
//! - [`services::url_resolver::UrlResolver`] - Cache-aside reads
//! - [`services::click_accounting::ClickAccounting`] - Background click counting
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
