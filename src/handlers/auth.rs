use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::auth_service::LoginResponse;
use crate::services::AuthService;
use crate::state::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - authenticate and receive a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) =
        validate::login_credentials(payload.email.as_deref(), payload.password.as_deref())?;

    let service = AuthService::new(state.store.clone(), state.config.security.clone());
    let response = service.login(email, password).await?;

    Ok(Json(response))
}
