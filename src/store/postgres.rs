use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{Note, Plan, Role, Tenant, User};

use super::{Datastore, NewNote, NewTenant, NewUser, NotePatch, StoreError};

/// Postgres-backed document store.
///
/// The pool is acquired once at process start and shared for the process
/// lifetime; `acquire_timeout` bounds connection establishment so a dead
/// database fails requests instead of hanging them.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Apply embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn tenant_from_row(row: &PgRow) -> Result<Tenant, StoreError> {
    let plan: String = row.get("plan");
    Ok(Tenant {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        plan: Plan::parse(&plan)
            .ok_or_else(|| StoreError::Query(format!("unknown plan '{}'", plan)))?,
        created_at: row.get("created_at"),
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: Role::parse(&role)
            .ok_or_else(|| StoreError::Query(format!("unknown role '{}'", role)))?,
        tenant_id: row.get("tenant_id"),
        created_at: row.get("created_at"),
    })
}

fn note_from_row(row: &PgRow) -> Note {
    Note {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        title: row.get("title"),
        content: row.get("content"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Datastore for PgStore {
    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
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

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, plan, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.slug)
        .bind(record.plan.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, plan, created_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, plan, created_at
            FROM tenants
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn set_tenant_plan(&self, id: Uuid, plan: Plan) -> Result<(), StoreError> {
        sqlx::query("UPDATE tenants SET plan = $1 WHERE id = $2")
            .bind(plan.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
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

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, tenant_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.tenant_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, role, tenant_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, role, tenant_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn users_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, password_hash, role, tenant_id, created_at
            FROM users
            WHERE tenant_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
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

        sqlx::query(
            r#"
            INSERT INTO notes (id, tenant_id, title, content, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.tenant_id)
        .bind(&record.title)
        .bind(&record.content)
        .bind(record.created_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn notes_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, tenant_id, title, content, created_by, created_at, updated_at
            FROM notes
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, title, content, created_by, created_at, updated_at
            FROM notes
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn count_notes(&self, tenant_id: Uuid) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn update_note_scoped(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Option<Note>, StoreError> {
        // Read-then-write, scoped on both queries. The tenant filter on the
        // UPDATE keeps the write safe even if the row moved between the two
        // statements.
        let existing = match self.note_scoped(tenant_id, id).await? {
            Some(note) => note,
            None => return Ok(None),
        };

        let title = patch.title.unwrap_or(existing.title);
        let content = patch.content.unwrap_or(existing.content);
        let updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4 AND tenant_id = $5
            "#,
        )
        .bind(&title)
        .bind(&content)
        .bind(updated_at)
        .bind(id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Note {
            title,
            content,
            updated_at,
            ..existing
        }))
    }

    async fn delete_note_scoped(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
