use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::models::Role;
use crate::state::AppState;

/// Authenticated identity extracted from the bearer token and attached to
/// the request for all downstream logic. Tenant scoping always reads
/// `tenant_id` from here, never from the request body.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub email: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            tenant_id: claims.tenant_id,
            role: claims.role,
            email: claims.email,
        }
    }
}

/// Stage-1 guard: validates the bearer token and injects the identity.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = auth::decode_token(&token, &state.config.security.jwt_secret).map_err(|e| {
        match e {
            auth::TokenError::MissingSecret => {
                tracing::error!("token decode attempted without a configured secret");
                ApiError::Internal
            }
            _ => {
                tracing::warn!("rejected bearer token: {}", e);
                ApiError::InvalidToken
            }
        }
    })?;

    request.extensions_mut().insert(Identity::from(claims));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| ApiError::MissingToken)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(ApiError::MissingToken)?;

    if token.trim().is_empty() {
        return Err(ApiError::MissingToken);
    }

    Ok(token.to_string())
}
