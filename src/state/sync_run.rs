use crate::state::SyncPhase;
use crate::storage::{StorageError, StorageResult, SyncReport};
use chrono::{DateTime, Utc};

/// Progress of one synchronization run through its phases
#[derive(Debug, Clone)]
pub struct SyncRun {
    phase: SyncPhase,
    fetched: usize,
    inserted: usize,
    skipped: usize,
    started_at: DateTime<Utc>,
}

impl SyncRun {
    /// Starts tracking a run over a batch of `fetched` entries
    pub fn new(fetched: usize) -> Self {
        Self {
            phase: SyncPhase::Idle,
            fetched,
            inserted: 0,
            skipped: 0,
            started_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn inserted(&self) -> usize {
        self.inserted
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Moves to `next`, counting inserts and skips as they happen
    pub fn advance(&mut self, next: SyncPhase) -> StorageResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(StorageError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        match next {
            SyncPhase::Inserted => self.inserted += 1,
            SyncPhase::Skipped => self.skipped += 1,
            _ => {}
        }

        tracing::trace!("Sync phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Produces the report for a committed run
    ///
    /// Returns an error if the run has not reached `Committed`.
    pub fn finish(&self) -> StorageResult<SyncReport> {
        if self.phase != SyncPhase::Committed {
            return Err(StorageError::InvalidTransition {
                from: self.phase,
                to: SyncPhase::Committed,
            });
        }

        Ok(SyncReport {
            fetched: self.fetched,
            inserted: self.inserted,
            skipped: self.skipped,
            started_at: self.started_at,
            finished_at: Utc::now(),
        })
    }
}
