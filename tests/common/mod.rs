use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use slate_api::config::{AppConfig, DatabaseConfig, Environment, SecurityConfig};
use slate_api::state::AppState;
use slate_api::store::memory::MemoryStore;
use slate_api::store::seed::seed_demo;

pub const JWT_SECRET: &str = "integration-test-secret";

/// An isolated server instance over a freshly seeded in-memory store.
/// Each test spawns its own so quota and membership state never bleeds
/// between tests.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        database: DatabaseConfig {
            url: None,
            max_connections: 5,
            connect_timeout_secs: 5,
        },
        security: SecurityConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 24 * 7,
            revalidate_identity: false,
        },
    }
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        seed_demo(store.as_ref())
            .await
            .context("failed to seed demo fixture")?;

        let app = slate_api::app(AppState::new(test_config(), store));

        // Bind port 0 for isolation; the OS picks a free one
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in one of the seeded demo users and return the raw response.
    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(res)
    }

    /// Bearer token for a seeded demo user (password "password").
    pub async fn token_for(&self, email: &str) -> Result<String> {
        let res = self.login(email, "password").await?;
        anyhow::ensure!(
            res.status().is_success(),
            "login failed for {}: {}",
            email,
            res.status()
        );
        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }

    pub async fn create_note(&self, token: &str, title: &str, content: &str) -> Result<reqwest::Response> {
        let res = self
            .client
            .post(self.url("/notes"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await?;
        Ok(res)
    }
}
