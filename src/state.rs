//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, ClickAccounting, LinkService};
use crate::domain::repositories::{TokenRepository, UrlRepository};
use crate::infrastructure::cache::UrlCache;

/// Handles to the services behind the HTTP layer.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn UrlRepository>>,
    pub auth_service: Arc<AuthService<dyn TokenRepository>>,
    pub cache: Arc<dyn UrlCache>,
    pub click_accounting: ClickAccounting,
    /// Public prefix for generated short URLs, e.g. `https://s.example.com`.
    pub base_url: String,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService<dyn UrlRepository>>,
        auth_service: Arc<AuthService<dyn TokenRepository>>,
        cache: Arc<dyn UrlCache>,
        click_accounting: ClickAccounting,
        base_url: String,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            cache,
            click_accounting,
            base_url,
        }
    }
}
