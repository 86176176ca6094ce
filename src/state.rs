//! Application state management

use crate::config::Config;
use crate::db::SqliteDb;
use crate::error::Result;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// SQLite database behind a bounded connection pool
    pub db: Arc<SqliteDb>,

    /// Runtime configuration
    pub config: Config,
}

impl AppState {
    /// Create application state: ensure the data directory exists and open
    /// the database with a pool sized to the worker count
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        tracing::info!("Data directory: {:?}", config.data_dir);

        // One connection headroom over the workers for on-demand reads
        let pool_size = config.workers as u32 + 1;
        let db = Arc::new(SqliteDb::new(&config.db_path(), pool_size)?);

        Ok(Self { db, config })
    }
}
