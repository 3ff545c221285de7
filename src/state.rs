use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::Datastore;

/// Shared application state: configuration plus the persistence handle,
/// both acquired once at process start and injected everywhere they are
/// needed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Datastore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Datastore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
