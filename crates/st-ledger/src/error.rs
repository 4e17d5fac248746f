//! Error types for st-ledger

use thiserror::Error;

/// Ledger and transport errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Request could not be sent or the response could not be read (L001)
    #[error("[L001] Store transport failed during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Store answered with an unexpected status (L002)
    #[error("[L002] Store rejected {operation} with status {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape (L003)
    #[error("[L003] Failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    /// Ledger collection did not reach a healthy state (L004)
    #[error("[L004] Ledger collection '{index}' is not healthy: {message}")]
    Unhealthy { index: String, message: String },

    /// Update targeted an id the ledger does not hold (L005)
    #[error("[L005] Ledger record not found: {0}")]
    RecordNotFound(String),

    /// Client could not be built from its configuration (L006)
    #[error("[L006] Invalid store client configuration: {0}")]
    Config(String),

    /// Mutex poisoned (L007)
    #[error("[L007] Ledger mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub(crate) fn transport(operation: &str, err: reqwest::Error) -> Self {
        LedgerError::Transport {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(operation: &str, err: impl std::fmt::Display) -> Self {
        LedgerError::Decode {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
