/// Phases of a single synchronization run
///
/// A run moves `Idle → SchemaEnsured → TransactionOpen`, then through one
/// `Lookup → Inserted | Skipped` step per entry, and ends in `Committed` or
/// `RolledBack`.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    // ===== Setup =====
    /// Nothing has touched the database yet
    Idle,

    /// The entries table exists
    SchemaEnsured,

    /// The batch transaction has begun
    TransactionOpen,

    // ===== Per Entry =====
    /// Looking for an exact match of the current entry
    Lookup,

    /// The current entry had no match and was inserted
    Inserted,

    /// The current entry matched an existing row and was left alone
    Skipped,

    // ===== Terminal =====
    /// The whole batch was committed
    Committed,

    /// The whole batch was rolled back
    RolledBack,
}

impl SyncPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }

    /// Returns true while the batch transaction is open
    pub fn in_transaction(&self) -> bool {
        matches!(
            self,
            Self::TransactionOpen | Self::Lookup | Self::Inserted | Self::Skipped
        )
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: SyncPhase) -> bool {
        use SyncPhase::*;

        match (self, next) {
            (Idle, SchemaEnsured) => true,
            (SchemaEnsured, TransactionOpen) => true,
            (TransactionOpen | Inserted | Skipped, Lookup) => true,
            (Lookup, Inserted | Skipped) => true,
            // A lookup that has not finished cannot be committed
            (TransactionOpen | Inserted | Skipped, Committed) => true,
            (from, RolledBack) => from.in_transaction(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SchemaEnsured => "schema_ensured",
            Self::TransactionOpen => "transaction_open",
            Self::Lookup => "lookup",
            Self::Inserted => "inserted",
            Self::Skipped => "skipped",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
