use std::sync::Arc;

use crate::config::ServerConfig;
use crate::generation::ContentGenerator;
use crate::store::DbPool;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Table store.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Backend used by every generation endpoint.
    pub generator: Arc<dyn ContentGenerator>,
}
