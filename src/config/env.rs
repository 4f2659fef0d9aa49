//! Environment-based configuration loading
//!
//! Deployments configure the sync through two variables, `baseURL` and
//! `dbFilePath`, usually kept in a `.env` file next to the database.

use crate::config::types::{Config, DatabaseConfig, HttpConfig, SourceConfig};
use crate::config::validation::validate;
use crate::ConfigError;

/// Variables holding the endpoint URL, in lookup order
pub const BASE_URL_VARS: &[&str] = &["baseURL", "EPICOLLECT_BASE_URL"];

/// Variables holding the database path, in lookup order
pub const DB_PATH_VARS: &[&str] = &["dbFilePath", "EPICOLLECT_DB_PATH"];

/// Variable overriding the HTTP user agent
const USER_AGENT_VARS: &[&str] = &["EPICOLLECT_USER_AGENT"];

/// Loads configuration from the process environment
///
/// A `.env` file in the working directory is read first if one exists;
/// variables already set in the environment take precedence over it.
/// Values returned by `overrides` (command-line flags) win over both.
pub fn load_config_from_env<F>(overrides: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    load_dotenv();
    config_from_lookup(|name| overrides(name).or_else(|| std::env::var(name).ok()))
}

/// Reads a `.env` file from the working directory into the environment
///
/// A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Builds a validated configuration from an arbitrary variable lookup
///
/// Empty values are treated as unset.
pub fn config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let first_set = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
    };

    let base_url =
        first_set(BASE_URL_VARS).ok_or_else(|| ConfigError::MissingVar(BASE_URL_VARS[0].into()))?;
    let db_path =
        first_set(DB_PATH_VARS).ok_or_else(|| ConfigError::MissingVar(DB_PATH_VARS[0].into()))?;

    let http = match first_set(USER_AGENT_VARS) {
        Some(user_agent) => HttpConfig { user_agent },
        None => HttpConfig::default(),
    };

    let config = Config {
        source: SourceConfig { base_url },
        database: DatabaseConfig { path: db_path },
        http,
    };

    validate(&config)?;

    Ok(config)
}
