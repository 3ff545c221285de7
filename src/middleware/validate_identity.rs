use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::Identity;

/// Optional stage between authentication and the handler: re-check that the
/// token's user and tenant still exist in the store.
///
/// Disabled by default -- claims are trusted until expiry, so a deleted
/// user or tenant keeps working until the token lapses. Enabling
/// `revalidate_identity` closes that window at the cost of two lookups per
/// request. Role and plan are deliberately NOT re-read here: attribute
/// changes take effect at re-login either way.
pub async fn validate_identity_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.security.revalidate_identity {
        let identity = request
            .extensions()
            .get::<Identity>()
            .ok_or(ApiError::NotAuthenticated)?;

        if state.store.user_by_id(identity.user_id).await?.is_none() {
            tracing::warn!("revalidation failed: user {} no longer exists", identity.user_id);
            return Err(ApiError::InvalidToken);
        }

        if state.store.tenant_by_id(identity.tenant_id).await?.is_none() {
            tracing::warn!(
                "revalidation failed: tenant {} no longer exists",
                identity.tenant_id
            );
            return Err(ApiError::InvalidToken);
        }
    }

    Ok(next.run(request).await)
}
