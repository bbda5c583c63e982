//! Domain layer containing business entities and repository contracts.
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click accounting event model
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a code and answers immediately
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel
//! 3. [`crate::application::services::click_accounting::run_click_worker`] applies
//!    the durable and cached increments independently

pub mod click_event;
pub mod entities;
pub mod repositories;
