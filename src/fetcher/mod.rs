//! HTTP fetcher for the entries export endpoint
//!
//! This module handles the single request made per run:
//! - Building the HTTP client with the configured user agent
//! - GET of the full entry set (no paging, no delta)
//! - Error classification into status, network and parse failures
//!
//! There is no retry: a failed fetch ends the run.

use crate::config::HttpConfig;
use crate::model::{EntriesResponse, Entry};
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Errors that end a run before storage is touched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from {url}: {message}")]
    Parse { url: String, message: String },
}

/// Builds an HTTP client with proper configuration
///
/// No request or connect timeout is set; a hung endpoint hangs the run.
///
/// # Example
///
/// ```no_run
/// use epicollect_sync::config::HttpConfig;
/// use epicollect_sync::fetcher::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .build()
}

/// Fetches every entry currently published at `base_url`
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `base_url` - Full URL of the entries export endpoint
///
/// # Returns
///
/// * `Ok(Vec<Entry>)` - Entries in the order the endpoint returned them
/// * `Err(FetchError)` - Non-200 status, transport failure, or a body that is
///   not `{ "data": { "entries": [...] } }` with well-formed entries
pub async fn fetch_entries(client: &Client, base_url: &str) -> Result<Vec<Entry>, FetchError> {
    let response = client
        .get(base_url)
        .send()
        .await
        .map_err(|source| network_error(base_url, source))?;

    let status = response.status();
    if status != StatusCode::OK {
        tracing::error!("Fetch from {} returned status {}", base_url, status);
        return Err(FetchError::Status {
            url: base_url.to_string(),
            status,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| network_error(base_url, source))?;

    let entries = parse_entries(&body).map_err(|message| {
        tracing::error!("Malformed response from {}: {}", base_url, message);
        FetchError::Parse {
            url: base_url.to_string(),
            message,
        }
    })?;

    tracing::info!("Fetched {} entries from {}", entries.len(), base_url);
    Ok(entries)
}

/// Parses an export body into its entries
fn parse_entries(body: &[u8]) -> Result<Vec<Entry>, String> {
    serde_json::from_slice::<EntriesResponse>(body)
        .map(EntriesResponse::into_entries)
        .map_err(|e| e.to_string())
}

fn network_error(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        tracing::error!("Request to {} timed out", url);
    } else if source.is_connect() {
        tracing::error!("Could not connect to {}: {}", url, source);
    } else {
        tracing::error!("Request to {} failed: {}", url, source);
    }

    FetchError::Network {
        url: url.to_string(),
        source,
    }
}
