//! Bearer token authentication middleware.
//!
//! Two layers share the same token handling:
//!
//! - [`require_identity`] rejects callers without a valid token
//! - [`optional_identity`] lets them through as anonymous
//!
//! Both insert an [`Identity`] extension for authenticated callers. Handlers
//! read it with `Extension<Identity>` or `Option<Extension<Identity>>`.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::domain::entities::OwnerId;
use crate::{error::AppError, state::AppState};

/// The authenticated owner behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub OwnerId);

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - Authorization header is missing
/// - Token format is invalid
/// - Token is not found or revoked
///
/// Adds `WWW-Authenticate: Bearer` header to 401 responses per RFC 6750.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/my-urls", get(my_urls_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_identity));
/// ```
pub async fn require_identity(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let owner_id = st.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(Identity(owner_id));

    Ok(next.run(req).await)
}

/// Identifies the caller when a valid Bearer token is present.
///
/// A missing, malformed, unknown or revoked token leaves the request anonymous.
pub async fn optional_identity(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let owner_id = match AuthBearer::from_request_parts(&mut parts, &()).await {
        Ok(AuthBearer(token)) => st.auth_service.identify(&token).await,
        Err(_) => None,
    };

    let mut req = Request::from_parts(parts, body);
    if let Some(owner_id) = owner_id {
        req.extensions_mut().insert(Identity(owner_id));
    }

    next.run(req).await
}
