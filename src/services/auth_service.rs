use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::{self, Claims};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::models::{Role, TenantSummary, User};
use crate::store::Datastore;

/// Login response: the bearer token plus the user and tenant the client
/// needs to render its session.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
    pub tenant: TenantSummary,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub email: String,
    pub role: Role,
    pub tenant_id: Uuid,
}

pub struct AuthService {
    store: Arc<dyn Datastore>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Datastore>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Look up the user by email and verify the password.
    ///
    /// Unknown email and wrong password return the identical error so the
    /// login surface cannot be used to enumerate accounts. The plaintext
    /// password is never logged.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let user = match self.store.user_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::warn!("login rejected: unknown account");
                return Err(ApiError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            tracing::warn!("login rejected: bad password for {}", user.id);
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Authenticate and issue a fresh identity token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let user = self.verify_credentials(email, password).await?;

        let tenant = self
            .store
            .tenant_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| {
                tracing::error!("user {} references missing tenant {}", user.id, user.tenant_id);
                ApiError::TenantMissing
            })?;

        let claims = Claims::new(
            user.id,
            user.tenant_id,
            user.role,
            user.email.clone(),
            self.security.jwt_expiry_hours,
        );
        let token = auth::issue(&claims, &self.security.jwt_secret).map_err(|e| {
            tracing::error!("token issue failed: {}", e);
            ApiError::Internal
        })?;

        tracing::debug!("issued token for {} in tenant {}", user.id, tenant.slug);

        Ok(LoginResponse {
            token,
            user: LoginUser {
                email: user.email,
                role: user.role,
                tenant_id: user.tenant_id,
            },
            tenant: TenantSummary::from(&tenant),
        })
    }
}
