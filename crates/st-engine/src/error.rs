//! Error types for st-engine

use st_ledger::LedgerError;
use thiserror::Error;

/// Fatal reconciliation errors. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// More than one failed record, a failed record that is not the tail, or
    /// a duplicated record (R001)
    #[error("[R001] Abort migration. Inconsistent ledger: {reason}")]
    InconsistentLedger { reason: String },

    /// The ledger references a script that is gone locally (R002)
    #[error("[R002] Abort migration. Script {file_name} doesn't exist anymore")]
    MissingScript { file_name: String },

    /// An already applied script was modified (R003)
    #[error("[R003] Abort migration. Checksum is different for script {file_name} (recorded {recorded}, current {current})")]
    ChecksumMismatch {
        file_name: String,
        recorded: String,
        current: String,
    },

    /// A new script sorts before an already recorded one (R004)
    #[error("[R004] Abort migration. A new script {found} has been inserted at position {position}, before already executed script {expected}")]
    OrderViolation {
        /// 1-based position in the ledger sequence
        position: usize,
        expected: String,
        found: String,
    },

    /// The store rejected a script payload; the failure has been recorded (R005)
    #[error("[R005] Abort migration. Error while executing {file_name}")]
    ApplyFailed { file_name: String },

    /// Ledger or transport failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
