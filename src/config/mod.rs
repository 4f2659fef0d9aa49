//! Configuration module for Epicollect-Sync
//!
//! Configuration comes either from the process environment (with an optional
//! `.env` file) or from a TOML file, and is validated before use.
//!
//! # Example
//!
//! ```no_run
//! use epicollect_sync::config::load_config_from_env;
//!
//! let config = load_config_from_env(|_| None).unwrap();
//! println!("Syncing {} into {}", config.source.base_url, config.database.path);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DatabaseConfig, HttpConfig, SourceConfig};

// Re-export loader functions
pub use env::{config_from_lookup, load_config_from_env, BASE_URL_VARS, DB_PATH_VARS};
pub use parser::load_config;
pub use validation::validate;
