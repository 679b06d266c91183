//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::backend::{BackendClient, CollectionHandle};
use crate::config::ApiConfig;
use crate::view::ViewOptions;
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend client (for health and shutdown)
    pub client: BackendClient,
    /// The `"words"` collection the dashboard reads and ingest writes
    pub words: CollectionHandle,
    /// Query each dashboard view subscribes with
    pub dashboard: Arc<ViewOptions>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for live dashboards
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(client: BackendClient, dashboard: ViewOptions, config: ApiConfig) -> Self {
        let hub_config = HubConfig {
            max_connections: config.max_connections,
        };

        Self {
            words: client.words(),
            client,
            dashboard: Arc::new(dashboard),
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
