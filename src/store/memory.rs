use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Note, Plan, Tenant, User};

use super::{Datastore, NewNote, NewTenant, NewUser, NotePatch, StoreError};

/// In-memory document store. Reference semantics for the tests and the
/// development fallback when no `DATABASE_URL` is configured.
///
/// Note creation happens entirely under the write lock, so the free-plan
/// count-then-insert sequence is serialized here; the Postgres backend
/// retains the documented race window.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

#[derive(Default)]
struct Collections {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, User>,
    notes: Vec<Note>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError> {
        let record = Tenant {
            id: Uuid::new_v4(),
            name: tenant.name,
            slug: tenant.slug,
            plan: tenant.plan,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.tenants.insert(record.id, record.clone());
        Ok(record)
    }

    async fn tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tenants.get(&id).cloned())
    }

    async fn tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn set_tenant_plan(&self, id: Uuid, plan: Plan) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(tenant) = inner.tenants.get_mut(&id) {
            tenant.plan = plan;
        }
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            tenant_id: user.tenant_id,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn users_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let now = Utc::now();
        let record = Note {
            id: Uuid::new_v4(),
            tenant_id: note.tenant_id,
            title: note.title,
            content: note.content,
            created_by: note.created_by,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner.notes.push(record.clone());
        Ok(record)
    }

    async fn notes_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let inner = self.inner.read().await;
        // Reverse insertion order first so equal timestamps still list
        // newest-first after the stable sort.
        let mut notes: Vec<Note> = inner
            .notes
            .iter()
            .rev()
            .filter(|n| n.tenant_id == tenant_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .iter()
            .find(|n| n.id == id && n.tenant_id == tenant_id)
            .cloned())
    }

    async fn count_notes(&self, tenant_id: Uuid) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.notes.iter().filter(|n| n.tenant_id == tenant_id).count() as i64)
    }

    async fn update_note_scoped(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError> {
        let mut inner = self.inner.write().await;
        let note = inner
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.tenant_id == tenant_id);

        Ok(note.map(|n| {
            if let Some(title) = patch.title {
                n.title = title;
            }
            if let Some(content) = patch.content {
                n.content = content;
            }
            n.updated_at = Utc::now();
            n.clone()
        }))
    }

    async fn delete_note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let len_before = inner.notes.len();
        inner
            .notes
            .retain(|n| !(n.id == id && n.tenant_id == tenant_id));
        Ok(inner.notes.len() < len_before)
    }
}
