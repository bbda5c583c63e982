//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Separate structs are used for creation
//! (`NewUrlRecord`) and for the stored form (`UrlRecord`).

pub mod url_record;

pub use url_record::{NewUrlRecord, OwnerId, UrlRecord};
