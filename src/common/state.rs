// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state containing the database pool and token configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    /// Token lifetime in hours, from JWT_EXPIRES_HOURS
    pub token_ttl_hours: i64,
}

pub type SharedState = Arc<RwLock<AppState>>;
