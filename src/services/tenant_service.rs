use std::sync::Arc;

use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::{Plan, Role, Tenant, UserSummary};
use crate::store::{Datastore, NewUser};

/// Initial password for invited users. An invited user is expected to log
/// in with this and have an out-of-band reset flow in front of it.
const DEFAULT_INVITE_PASSWORD: &str = "password";

/// Tenant administration: plan upgrade and membership management.
///
/// Every operation is addressed by slug but re-validated against the
/// identity's tenant id, so an admin of tenant A can never act on tenant
/// B's slug even if guessed.
pub struct TenantService {
    store: Arc<dyn Datastore>,
}

impl TenantService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Resolve a slug and require that it names the identity's own tenant.
    async fn owned_tenant(&self, slug: &str, identity: &Identity) -> Result<Tenant, ApiError> {
        let tenant = self
            .store
            .tenant_by_slug(slug)
            .await?
            .ok_or(ApiError::TenantNotFound)?;

        if tenant.id != identity.tenant_id {
            tracing::warn!(
                "admin {} of tenant {} attempted to act on tenant '{}'",
                identity.email,
                identity.tenant_id,
                slug
            );
            return Err(ApiError::Forbidden);
        }

        Ok(tenant)
    }

    /// Set the plan to pro. Idempotent: upgrading an already-pro tenant is
    /// a no-op success.
    pub async fn upgrade(&self, slug: &str, identity: &Identity) -> Result<Plan, ApiError> {
        let tenant = self.owned_tenant(slug, identity).await?;
        self.store.set_tenant_plan(tenant.id, Plan::Pro).await?;
        tracing::info!("tenant {} upgraded to pro", tenant.slug);
        Ok(Plan::Pro)
    }

    /// Create a user under this tenant with the default initial password.
    /// Email is globally unique, so the conflict check spans all tenants.
    pub async fn invite(
        &self,
        slug: &str,
        identity: &Identity,
        email: &str,
        role: Role,
    ) -> Result<UserSummary, ApiError> {
        let tenant = self.owned_tenant(slug, identity).await?;

        if self.store.user_by_email(email).await?.is_some() {
            return Err(ApiError::UserExists);
        }

        let password_hash = hash_password(DEFAULT_INVITE_PASSWORD).map_err(|e| {
            tracing::error!("failed to hash invite password: {}", e);
            ApiError::Internal
        })?;

        let user = self
            .store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash,
                role,
                tenant_id: tenant.id,
            })
            .await?;

        tracing::info!("invited {} to tenant {} as {}", user.email, tenant.slug, role.as_str());

        Ok(UserSummary::from(&user))
    }

    /// All users of the tenant, projected to email and role only.
    pub async fn list_users(
        &self,
        slug: &str,
        identity: &Identity,
    ) -> Result<Vec<UserSummary>, ApiError> {
        let tenant = self.owned_tenant(slug, identity).await?;
        let users = self.store.users_by_tenant(tenant.id).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::store::memory::MemoryStore;
    use crate::store::NewTenant;
    use uuid::Uuid;

    async fn fixture() -> (TenantService, Arc<MemoryStore>, Tenant, Identity) {
        let store = Arc::new(MemoryStore::new());
        let tenant = store
            .insert_tenant(NewTenant {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                plan: Plan::Free,
            })
            .await
            .unwrap();
        let admin = Identity {
            user_id: Uuid::new_v4(),
            tenant_id: tenant.id,
            role: Role::Admin,
            email: "admin@acme.test".to_string(),
        };
        (TenantService::new(store.clone()), store, tenant, admin)
    }

    #[tokio::test]
    async fn upgrade_is_idempotent() {
        let (service, store, tenant, admin) = fixture().await;

        assert_eq!(service.upgrade("acme", &admin).await.unwrap(), Plan::Pro);
        assert_eq!(service.upgrade("acme", &admin).await.unwrap(), Plan::Pro);
        assert_eq!(
            store.tenant_by_id(tenant.id).await.unwrap().unwrap().plan,
            Plan::Pro
        );
    }

    #[tokio::test]
    async fn foreign_slug_is_forbidden_even_for_admins() {
        let (service, store, _, admin) = fixture().await;
        store
            .insert_tenant(NewTenant {
                name: "Globex".to_string(),
                slug: "globex".to_string(),
                plan: Plan::Free,
            })
            .await
            .unwrap();

        let err = service.upgrade("globex", &admin).await.unwrap_err();
        assert_eq!(err.error_code(), "forbidden");

        // Globex is untouched
        let globex = store.tenant_by_slug("globex").await.unwrap().unwrap();
        assert_eq!(globex.plan, Plan::Free);
    }

    #[tokio::test]
    async fn unknown_slug_is_tenant_not_found() {
        let (service, _, _, admin) = fixture().await;
        let err = service.upgrade("initech", &admin).await.unwrap_err();
        assert_eq!(err.error_code(), "tenant_not_found");
    }

    #[tokio::test]
    async fn invite_creates_member_with_usable_default_password() {
        let (service, store, tenant, admin) = fixture().await;

        let summary = service
            .invite("acme", &admin, "new@acme.test", Role::Member)
            .await
            .unwrap();
        assert_eq!(summary.email, "new@acme.test");
        assert_eq!(summary.role, Role::Member);

        let user = store.user_by_email("new@acme.test").await.unwrap().unwrap();
        assert_eq!(user.tenant_id, tenant.id);
        assert!(verify_password(DEFAULT_INVITE_PASSWORD, &user.password_hash));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_across_tenants() {
        let (service, store, _, admin) = fixture().await;
        let globex = store
            .insert_tenant(NewTenant {
                name: "Globex".to_string(),
                slug: "globex".to_string(),
                plan: Plan::Free,
            })
            .await
            .unwrap();
        // Email already taken under a different tenant
        store
            .insert_user(NewUser {
                email: "taken@globex.test".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Member,
                tenant_id: globex.id,
            })
            .await
            .unwrap();

        let err = service
            .invite("acme", &admin, "taken@globex.test", Role::Member)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "user_exists");
    }

    #[tokio::test]
    async fn list_users_projects_email_and_role_only() {
        let (service, _, _, admin) = fixture().await;
        service
            .invite("acme", &admin, "a@acme.test", Role::Member)
            .await
            .unwrap();
        service
            .invite("acme", &admin, "b@acme.test", Role::Admin)
            .await
            .unwrap();

        let users = service.list_users("acme", &admin).await.unwrap();
        assert_eq!(users.len(), 2);
        let serialized = serde_json::to_value(&users).unwrap();
        for user in serialized.as_array().unwrap() {
            let obj = user.as_object().unwrap();
            assert_eq!(obj.len(), 2);
            assert!(obj.contains_key("email"));
            assert!(obj.contains_key("role"));
        }
    }
}
