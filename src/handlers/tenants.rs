use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::{Plan, UserSummary};
use crate::services::TenantService;
use crate::state::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpgradeResponse {
    pub ok: bool,
    pub plan: Plan,
}

/// POST /tenants/:slug/upgrade - set the plan to pro (admin only)
pub async fn upgrade_tenant(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(slug): Path<String>,
) -> Result<Json<UpgradeResponse>, ApiError> {
    let plan = TenantService::new(state.store.clone())
        .upgrade(&slug, &identity)
        .await?;
    Ok(Json(UpgradeResponse { ok: true, plan }))
}

/// POST /tenants/:slug/invite - create a user under this tenant (admin only)
pub async fn invite_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(slug): Path<String>,
    Json(payload): Json<InviteRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let (email, role) =
        validate::invite_fields(payload.email.as_deref(), payload.role.as_deref())?;

    let summary = TenantService::new(state.store.clone())
        .invite(&slug, &identity, email, role)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /tenants/:slug/users - tenant membership, email and role only
/// (admin only)
pub async fn list_tenant_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let users = TenantService::new(state.store.clone())
        .list_users(&slug, &identity)
        .await?;
    Ok(Json(json!({ "users": users })))
}
