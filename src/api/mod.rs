//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into application service calls and
//! formats responses according to API contracts.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Authentication, rate limiting and tracing middleware
//! - [`routes`] - Route grouping by authentication mode

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
