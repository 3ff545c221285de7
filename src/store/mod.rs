pub mod memory;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Note, Plan, Role, Tenant, User};

/// Errors from the persistence layer. Internal detail stays here; the API
/// layer converts to a generic server error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Tenant fields supplied at creation; id and created_at are
/// server-assigned.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub plan: Plan,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub tenant_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_by: Uuid,
}

/// Partial note mutation. `None` leaves a field unchanged; `Some("")`
/// overwrites with an empty string.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Document-store seam over tenants, users, and notes.
///
/// Every note operation takes the requesting tenant's id and filters by it
/// inside the store. Handlers never get a chance to read or mutate another
/// tenant's notes, regardless of what ids the client supplies.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn health(&self) -> Result<(), StoreError>;

    // Tenant directory
    async fn insert_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError>;
    async fn tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, StoreError>;
    async fn tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, StoreError>;
    /// Idempotent; setting the current plan again is a no-op success.
    async fn set_tenant_plan(&self, id: Uuid, plan: Plan) -> Result<(), StoreError>;

    // Users (email is globally unique across tenants)
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn users_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<User>, StoreError>;

    // Notes, all tenant-scoped
    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError>;
    /// All notes for the tenant, newest first.
    async fn notes_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Note>, StoreError>;
    async fn note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Note>, StoreError>;
    async fn count_notes(&self, tenant_id: Uuid) -> Result<i64, StoreError>;
    async fn update_note_scoped(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError>;
    /// Returns false when the note does not exist or belongs to another
    /// tenant; callers treat both identically.
    async fn delete_note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
