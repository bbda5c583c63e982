//! Handler for the caller profile endpoint.

use axum::{Extension, Json, extract::State};

use crate::api::dto::profile::ProfileResponse;
use crate::api::middleware::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the owner the Bearer token authenticates as.
///
/// # Endpoint
///
/// `GET /api/profile`
///
/// # Response
///
/// ```json
/// { "owner_id": 42, "link_count": 3 }
/// ```
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(Identity(owner_id)): Extension<Identity>,
) -> Result<Json<ProfileResponse>, AppError> {
    let link_count = state.link_service.list_by_owner(owner_id).await?.len();

    Ok(Json(ProfileResponse {
        owner_id,
        link_count,
    }))
}
