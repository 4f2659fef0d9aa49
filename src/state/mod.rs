//! State module for tracking synchronization progress
//!
//! # Components
//!
//! - `SyncPhase`: The phase a run is in (schema, transaction, per-entry lookup, terminal)
//! - `SyncRun`: Current phase plus insert/skip counters for one run

mod sync_phase;
mod sync_run;

// Re-export main types
pub use sync_phase::SyncPhase;
pub use sync_run::SyncRun;
