//! Epicollect-Sync: mirrors survey submissions into a local SQLite database
//!
//! This crate fetches the full entry set of an Epicollect5 project and inserts
//! every entry that is not already stored, row for row, inside one transaction.

pub mod config;
pub mod fetcher;
pub mod model;
pub mod state;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for Epicollect-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetcher::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Epicollect-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::Entry;
pub use state::{SyncPhase, SyncRun};
pub use storage::{SqliteStorage, Storage, SyncReport};
pub use sync::{run_sync, synchronize};
