use std::sync::Arc;

use anyhow::Context;

use slate_api::config::AppConfig;
use slate_api::state::AppState;
use slate_api::store::memory::MemoryStore;
use slate_api::store::postgres::PgStore;
use slate_api::store::Datastore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Refuses to start without a signing secret
    let config = AppConfig::from_env().context("configuration")?;
    tracing::info!("Starting slate-api in {:?} mode", config.environment);

    // Acquired once here, released at shutdown, never re-acquired per
    // request.
    let store: Arc<dyn Datastore> = match config.database.url {
        Some(_) => {
            let store = PgStore::connect(&config.database)
                .await
                .context("database connection")?;
            store.migrate().await.context("database migration")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = slate_api::app(AppState::new(config, store));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 slate-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
