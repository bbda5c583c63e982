//! Business logic services for the application layer.

pub mod auth_service;
pub mod click_accounting;
pub mod code_generator;
pub mod link_service;
pub mod url_resolver;

pub use auth_service::AuthService;
pub use click_accounting::{ClickAccounting, ClickRecorder, run_click_worker};
pub use code_generator::CodeGenerator;
pub use link_service::{LinkService, ShortenCommand};
pub use url_resolver::UrlResolver;
