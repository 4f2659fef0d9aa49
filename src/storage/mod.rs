//! Storage module for persisting survey entries
//!
//! This module handles all database operations, including:
//! - Creating the `entries` table
//! - The insert-if-absent batch synchronization
//! - Row counts for reporting

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// Outcome of a committed synchronization
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Entries in the fetched batch
    pub fetched: usize,
    /// Entries written as new rows
    pub inserted: usize,
    /// Entries that already had an identical row
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Wall-clock time between the start of the run and the commit
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
