use std::sync::Arc;

use shared_config::AppConfig;

use crate::pool::DbPool;

/// State shared by every router: the startup configuration and the pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: DbPool,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, pool: DbPool) -> Self {
        Self { config, pool }
    }
}
