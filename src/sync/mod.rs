//! Synchronization run orchestration
//!
//! One run is strictly sequential:
//! 1. Build the HTTP client and fetch the full entry set
//! 2. Open the database (only if the fetch succeeded)
//! 3. Create or verify the entries table
//! 4. Insert-if-absent the batch in one transaction
//! 5. Close the database
//!
//! A failed fetch leaves the database untouched. A schema failure ends the
//! run. A close failure is logged and does not change the outcome.

use crate::config::Config;
use crate::fetcher::{build_http_client, fetch_entries};
use crate::model::Entry;
use crate::storage::{SqliteStorage, Storage, SyncReport};
use crate::SyncError;
use std::path::Path;

/// Synchronizes `entries` into `storage`, reporting only success or failure
///
/// The schema is created or verified first. Every failure is logged here.
///
/// # Returns
///
/// `true` if the batch was committed, `false` if nothing was written
pub fn synchronize<S: Storage + ?Sized>(storage: &mut S, entries: &[Entry]) -> bool {
    commit_batch(storage, entries).is_ok()
}

/// Schema check and batch sync, logging the outcome once
fn commit_batch<S: Storage + ?Sized>(
    storage: &mut S,
    entries: &[Entry],
) -> Result<SyncReport, SyncError> {
    if let Err(e) = storage.ensure_schema() {
        tracing::error!("{}", e);
        return Err(e.into());
    }
    tracing::info!("Entries table created or verified");

    match storage.sync_entries(entries) {
        Ok(report) => {
            tracing::info!(
                "Synchronized {} entries ({} new, {} already stored) in {}ms",
                report.fetched,
                report.inserted,
                report.skipped,
                report.elapsed().num_milliseconds()
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!("Synchronization failed, nothing was written: {}", e);
            Err(e.into())
        }
    }
}

/// Runs one complete fetch-and-synchronize cycle
///
/// Each failing step logs its cause before the error is returned, so
/// callers only need to act on the result.
///
/// # Arguments
///
/// * `config` - Validated configuration
///
/// # Returns
///
/// * `Ok(SyncReport)` - The batch was committed
/// * `Err(SyncError)` - The fetch, schema, or synchronization step failed
pub async fn run_sync(config: &Config) -> Result<SyncReport, SyncError> {
    let client = build_http_client(&config.http).map_err(|e| {
        tracing::error!("Could not build the HTTP client: {}", e);
        SyncError::from(e)
    })?;

    let entries = match fetch_entries(&client, &config.source.base_url).await {
        Ok(entries) => entries,
        Err(e) => {
            // the fetcher has logged the cause
            tracing::warn!("No data received, database left untouched");
            return Err(e.into());
        }
    };

    let mut storage = SqliteStorage::open(Path::new(&config.database.path)).map_err(|e| {
        tracing::error!("Could not open {}: {}", config.database.path, e);
        SyncError::from(e)
    })?;

    let outcome = commit_batch(&mut storage, &entries);

    match storage.close() {
        Ok(()) => tracing::info!("Database closed"),
        Err(e) => tracing::warn!("{}", e),
    }

    if let Ok(report) = &outcome {
        tracing::info!(
            "Entries synchronized into {} ({} new)",
            config.database.path,
            report.inserted
        );
    }

    outcome
}
