//! Shared application state for the HTTP surface.
//!
//! `CoreState` owns the configuration and hands out one SQLite connection
//! per request. Concurrent writers are serialized by SQLite itself
//! (`IMMEDIATE` batch transactions plus `busy_timeout`).

use std::path::Path;

use crate::config::{AnalyzerConfig, ConfigError};
use crate::db;

pub struct CoreState {
    pub config: AnalyzerConfig,
}

impl CoreState {
    /// Create the state and make sure the catalog exists and is migrated.
    pub fn open(config: AnalyzerConfig) -> Result<Self, CoreError> {
        let conn = db::open_database(&config.db_path)?;
        let tables = db::count_tables(&conn)?;
        tracing::info!(
            path = %config.db_path.display(),
            tables,
            "Catalog database ready"
        );
        Ok(Self { config })
    }

    /// Build from environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::open(AnalyzerConfig::from_env()?)
    }

    /// Open a database connection for one request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.config.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
