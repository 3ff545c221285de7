//! Demo fixture: two tenants with an admin and a member each.

use anyhow::Result;

use crate::auth::password::hash_password;
use crate::models::{Plan, Role};

use super::{Datastore, NewTenant, NewUser};

pub const DEMO_PASSWORD: &str = "password";

/// Seed the predefined tenants and users into an empty store.
pub async fn seed_demo(store: &dyn Datastore) -> Result<()> {
    // All demo users share one password, so hash once.
    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow::anyhow!("failed to hash demo password: {}", e))?;

    let acme = store
        .insert_tenant(NewTenant {
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            plan: Plan::Free,
        })
        .await?;
    let globex = store
        .insert_tenant(NewTenant {
            name: "Globex".to_string(),
            slug: "globex".to_string(),
            plan: Plan::Free,
        })
        .await?;

    let users = [
        ("admin@acme.test", Role::Admin, acme.id),
        ("user@acme.test", Role::Member, acme.id),
        ("admin@globex.test", Role::Admin, globex.id),
        ("user@globex.test", Role::Member, globex.id),
    ];

    for (email, role, tenant_id) in users {
        store
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: password_hash.clone(),
                role,
                tenant_id,
            })
            .await?;
    }

    Ok(())
}
