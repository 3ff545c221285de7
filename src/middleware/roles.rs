use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::models::Role;

use super::auth::Identity;

/// Stage-2 guard logic: declarative role membership check.
pub fn check_role(identity: Option<&Identity>, expected: Role) -> Result<(), ApiError> {
    let identity = identity.ok_or(ApiError::NotAuthenticated)?;
    if identity.role != expected {
        tracing::warn!(
            "role check failed: {} is {} but the route requires {}",
            identity.email,
            identity.role.as_str(),
            expected.as_str()
        );
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Admin gate for tenant administration routes.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(request.extensions().get::<Identity>(), Role::Admin)?;
    Ok(next.run(request).await)
}
