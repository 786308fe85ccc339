use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "dspm-analyzer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Bulk batches carry text samples, so the default axum limit (2 MB) is too small.
const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Get the application data directory.
/// `<local data dir>/dspm-analyzer`, or the working directory when the
/// platform reports no data directory.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the catalog database
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("catalog.db")
}

/// Log filter used when `RUST_LOG` is not set
pub fn default_log_filter() -> &'static str {
    "dspm_analyzer=info,tower_http=info"
}

/// Runtime configuration for the analyzer service.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// SQLite catalog file.
    pub db_path: PathBuf,
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Request body limit for ingest endpoints.
    pub max_body_bytes: usize,
    /// `tracing` filter directives.
    pub log_filter: String,
}

impl AnalyzerConfig {
    /// Build from `DSPM_DB_PATH`, `DSPM_BIND_ADDR`, `DSPM_MAX_BODY_BYTES` and `RUST_LOG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DSPM_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let bind_raw = lookup("DSPM_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "DSPM_BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let max_body_bytes = match lookup("DSPM_MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "DSPM_MAX_BODY_BYTES",
                    value: raw.clone(),
                })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let log_filter = lookup("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_log_filter().to_string());

        Ok(Self {
            db_path,
            bind_addr,
            max_body_bytes,
            log_filter,
        })
    }

    /// Config pointing at an explicit database file, defaults elsewhere.
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_filter: default_log_filter().to_string(),
        }
    }
}
