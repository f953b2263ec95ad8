//! Shared handler state.

use std::sync::Arc;

use clubpage_store::Store;

use crate::config::ServerConfig;
use crate::events::EventBroadcaster;

/// Cheap to clone; every handler receives it through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    config: Arc<ServerConfig>,
    /// Per-scope `order_changed` feed for SSE subscribers.
    broadcaster: Arc<EventBroadcaster>,
}

impl AppState {
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            broadcaster: Arc::new(EventBroadcaster::new()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
