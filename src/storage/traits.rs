//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::Entry;
use crate::state::SyncPhase;
use crate::storage::SyncReport;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create or verify the entries table: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Failed to close the database: {0}")]
    Close(#[source] rusqlite::Error),

    #[error("Invalid sync transition: {from} -> {to}")]
    InvalidTransition { from: SyncPhase, to: SyncPhase },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Rows are append-only: nothing in this interface updates or deletes.
pub trait Storage {
    /// Creates the entries table if it is missing
    fn ensure_schema(&mut self) -> StorageResult<()>;

    /// Inserts every entry that has no exact match, as one transaction
    ///
    /// Entries are processed in order. An entry is skipped when a stored row
    /// equals it in all eight fields. Any lookup or insert failure rolls back
    /// the whole batch and is returned; nothing is committed in that case.
    ///
    /// # Returns
    ///
    /// A report of inserted and skipped counts for the committed batch
    fn sync_entries(&mut self, entries: &[Entry]) -> StorageResult<SyncReport>;

    /// Counts all stored rows
    fn count_entries(&self) -> StorageResult<u64>;

    /// Counts stored rows equal to `entry` in all eight fields
    fn count_matching(&self, entry: &Entry) -> StorageResult<u64>;

    /// Loads all stored rows in insertion order
    fn list_entries(&self) -> StorageResult<Vec<Entry>>;
}
