//! DTO for the caller profile endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::OwnerId;

/// Identity behind the caller's token.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub owner_id: OwnerId,
    /// Links owned by the caller, expired ones included.
    pub link_count: usize,
}
