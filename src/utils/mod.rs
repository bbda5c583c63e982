//! Utility functions used across the application.
//!
//! - [`code_generator`] - Short code alphabet, random drawing and validation
//! - [`api_token`] - Raw API token generation

pub mod api_token;
pub mod code_generator;
