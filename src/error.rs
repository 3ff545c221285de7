// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-facing codes.
///
/// The wire body is always `{"error": "<code>"}`; codes deliberately carry
/// no internal identifiers or cross-tenant existence information. Absent
/// and cross-tenant resources share `not_found`, and unknown email shares
/// `invalid_credentials` with a wrong password.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MissingCredentials,
    MissingTitle,
    MissingFields,

    // 401 Unauthorized
    MissingToken,
    InvalidToken,
    InvalidCredentials,
    NotAuthenticated,

    // 403 Forbidden
    Forbidden,
    NoteLimitReached,

    // 404 Not Found
    NotFound,
    TenantNotFound,

    // 409 Conflict
    UserExists,

    // 500 Internal Server Error
    /// An authenticated user's tenant is missing from the directory. Should
    /// be unreachable with a consistent store.
    TenantMissing,
    Internal,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::BAD_REQUEST,
            ApiError::MissingTitle => StatusCode::BAD_REQUEST,
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NoteLimitReached => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::TenantNotFound => StatusCode::NOT_FOUND,
            ApiError::UserExists => StatusCode::CONFLICT,
            ApiError::TenantMissing => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingCredentials => "missing_credentials",
            ApiError::MissingTitle => "missing_title",
            ApiError::MissingFields => "missing_fields",
            ApiError::MissingToken => "missing_token",
            ApiError::InvalidToken => "invalid_token",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::NotAuthenticated => "not_authenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NoteLimitReached => "note_limit_reached",
            ApiError::NotFound => "not_found",
            ApiError::TenantNotFound => "tenant_not_found",
            ApiError::UserExists => "user_exists",
            ApiError::TenantMissing => "tenant_not_found",
            ApiError::Internal => "server_error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.error_code() })
    }
}

// Convert store errors to ApiError without leaking driver detail
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => {
                tracing::error!("store unavailable: {}", msg);
                ApiError::Internal
            }
            StoreError::Query(msg) => {
                tracing::error!("store query error: {}", msg);
                ApiError::Internal
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("sqlx error: {}", sqlx_err);
                ApiError::Internal
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_code())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::MissingTitle.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NoteLimitReached.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::UserExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::TenantMissing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_tenant_on_login_path_keeps_code_but_not_status() {
        // Both surface "tenant_not_found" to the client; only the status
        // distinguishes the defensive 500 from the note-create 404.
        assert_eq!(ApiError::TenantMissing.error_code(), "tenant_not_found");
        assert_eq!(ApiError::TenantNotFound.error_code(), "tenant_not_found");
        assert_ne!(
            ApiError::TenantMissing.status_code(),
            ApiError::TenantNotFound.status_code()
        );
    }

    #[test]
    fn body_shape_is_bare_error_code() {
        let body = ApiError::Forbidden.to_json();
        assert_eq!(body, serde_json::json!({"error": "forbidden"}));
    }
}
