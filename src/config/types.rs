use serde::Deserialize;

/// Main configuration structure for Epicollect-Sync
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Remote data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Full URL of the entries endpoint, including any query string
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Local database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with the fetch request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
