use std::sync::Arc;

use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::models::{Note, Plan};
use crate::store::{Datastore, NewNote, NotePatch};
use crate::validate;

/// Maximum number of notes a free-plan tenant may hold.
pub const FREE_LIMIT: i64 = 3;

/// Note CRUD, every operation scoped to the identity's tenant.
///
/// The quota check is count-then-insert with no transaction: two
/// concurrent creates at the limit can both pass and transiently exceed
/// it. The in-memory backend happens to serialize creates; the Postgres
/// backend does not.
pub struct NoteService {
    store: Arc<dyn Datastore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        identity: &Identity,
        title: String,
        content: String,
    ) -> Result<Note, ApiError> {
        validate::note_title(&title)?;

        let tenant = self
            .store
            .tenant_by_id(identity.tenant_id)
            .await?
            .ok_or(ApiError::TenantNotFound)?;

        if tenant.plan == Plan::Free {
            let count = self.store.count_notes(identity.tenant_id).await?;
            if count >= FREE_LIMIT {
                tracing::debug!(
                    "note create rejected for tenant {}: free plan at limit",
                    tenant.slug
                );
                return Err(ApiError::NoteLimitReached);
            }
        }

        let note = self
            .store
            .insert_note(NewNote {
                tenant_id: identity.tenant_id,
                title,
                content,
                created_by: identity.user_id,
            })
            .await?;

        Ok(note)
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<Note>, ApiError> {
        Ok(self.store.notes_by_tenant(identity.tenant_id).await?)
    }

    /// "Doesn't exist" and "belongs to another tenant" are the same
    /// not_found, so note ids leak nothing across tenants.
    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<Note, ApiError> {
        self.store
            .note_scoped(identity.tenant_id, id)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Note, ApiError> {
        self.store
            .update_note_scoped(identity.tenant_id, id, patch)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_note_scoped(identity.tenant_id, id).await? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Tenant};
    use crate::store::memory::MemoryStore;
    use crate::store::NewTenant;

    async fn fixture() -> (NoteService, Arc<MemoryStore>, Tenant, Identity) {
        let store = Arc::new(MemoryStore::new());
        let tenant = store
            .insert_tenant(NewTenant {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                plan: Plan::Free,
            })
            .await
            .unwrap();
        let identity = Identity {
            user_id: Uuid::new_v4(),
            tenant_id: tenant.id,
            role: Role::Member,
            email: "user@acme.test".to_string(),
        };
        (NoteService::new(store.clone()), store, tenant, identity)
    }

    #[tokio::test]
    async fn fourth_note_hits_free_limit_and_writes_nothing() {
        let (service, store, _, identity) = fixture().await;

        for title in ["A", "B", "C"] {
            service
                .create(&identity, title.to_string(), String::new())
                .await
                .unwrap();
        }

        let err = service
            .create(&identity, "D".to_string(), String::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "note_limit_reached");
        assert_eq!(store.count_notes(identity.tenant_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn upgrade_lifts_the_limit() {
        let (service, store, tenant, identity) = fixture().await;

        for title in ["A", "B", "C"] {
            service
                .create(&identity, title.to_string(), String::new())
                .await
                .unwrap();
        }
        store.set_tenant_plan(tenant.id, Plan::Pro).await.unwrap();

        service
            .create(&identity, "D".to_string(), String::new())
            .await
            .unwrap();
        assert_eq!(store.count_notes(identity.tenant_id).await.unwrap(), 4);

        let titles: Vec<String> = service
            .list(&identity)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["D", "C", "B", "A"]);
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_lookup() {
        let (service, store, _, identity) = fixture().await;

        let err = service
            .create(&identity, String::new(), "body".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "missing_title");
        assert_eq!(store.count_notes(identity.tenant_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cross_tenant_access_reads_as_not_found() {
        let (service, store, _, identity) = fixture().await;
        let other = store
            .insert_tenant(NewTenant {
                name: "Globex".to_string(),
                slug: "globex".to_string(),
                plan: Plan::Free,
            })
            .await
            .unwrap();
        let intruder = Identity {
            user_id: Uuid::new_v4(),
            tenant_id: other.id,
            role: Role::Member,
            email: "user@globex.test".to_string(),
        };

        let note = service
            .create(&identity, "secret".to_string(), String::new())
            .await
            .unwrap();

        for err in [
            service.get(&intruder, note.id).await.unwrap_err(),
            service
                .update(&intruder, note.id, NotePatch::default())
                .await
                .unwrap_err(),
            service.delete(&intruder, note.id).await.unwrap_err(),
        ] {
            assert_eq!(err.error_code(), "not_found");
        }

        // The note is untouched for its owner
        assert_eq!(service.get(&identity, note.id).await.unwrap().title, "secret");
    }

    #[tokio::test]
    async fn partial_update_preserves_omitted_fields() {
        let (service, _, _, identity) = fixture().await;
        let note = service
            .create(&identity, "title".to_string(), "content".to_string())
            .await
            .unwrap();

        let updated = service
            .update(
                &identity,
                note.id,
                NotePatch {
                    title: Some("renamed".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, "content");
    }
}
