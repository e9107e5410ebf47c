//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

/// Directory name used under the platform data directory
pub const DATA_DIR_NAME: &str = "store-toolset";

/// Default retention for the cached last run log
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Runtime configuration for the cleanup pipeline and its adapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsetConfig {
    /// SQLite file acting as the host store
    pub database_path: PathBuf,

    /// Directory holding archived run logs
    pub log_dir: PathBuf,

    /// File name prefix for archived run logs
    pub log_prefix: String,

    /// How long the last run log stays visible
    pub cache_ttl: Duration,
}

impl ToolsetConfig {
    /// Get the default data directory
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME)
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = path.into();
        self
    }
}

impl Default for ToolsetConfig {
    fn default() -> Self {
        let data_dir = Self::default_data_dir();
        Self {
            database_path: data_dir.join("store.sqlite"),
            log_dir: data_dir.join("uploads").join("store-toolset-logs"),
            log_prefix: "store-toolset".to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}
