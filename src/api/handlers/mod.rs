//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod profile;
pub mod redirect;
pub mod shorten;
pub mod stats;

pub use health::health_handler;
pub use profile::profile_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::{my_urls_handler, stats_handler};
