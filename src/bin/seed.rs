//! Reset and seed the Postgres database with the demo tenants and users.

use anyhow::Context;

use slate_api::config::AppConfig;
use slate_api::store::postgres::PgStore;
use slate_api::store::seed::seed_demo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("configuration")?;
    let store = PgStore::connect(&config.database)
        .await
        .context("database connection")?;
    store.migrate().await.context("database migration")?;

    // Start from a clean slate, children first
    sqlx::query("DELETE FROM notes").execute(store.pool()).await?;
    sqlx::query("DELETE FROM users").execute(store.pool()).await?;
    sqlx::query("DELETE FROM tenants").execute(store.pool()).await?;

    seed_demo(&store).await?;

    println!("Seed complete");
    Ok(())
}
