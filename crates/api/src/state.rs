use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone. Role lookups are not cached here; see [`crate::roles`].
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: apresiasi_db::DbPool,
    /// Server configuration (quota, role overrides, JWT settings).
    pub config: Arc<ServerConfig>,
}
