//! Ledger client trait definition

use crate::error::LedgerResult;
use async_trait::async_trait;
use st_core::{Execution, ExecutionRecord};

/// Result of executing a script payload against the target store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadOutcome {
    /// Whether the store accepted the payload
    pub succeeded: bool,

    /// Free-form response text, logged but never interpreted
    pub diagnostics: String,
}

/// Access to the execution ledger and the target store
///
/// Implementations must be Send + Sync for async operation. The engine awaits
/// every call before issuing the next one.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Check if the ledger collection exists
    async fn collection_exists(&self) -> LedgerResult<bool>;

    /// Create the ledger collection if missing and wait until it is usable
    async fn create_collection(&self) -> LedgerResult<()>;

    /// Number of records in the ledger
    async fn count(&self) -> LedgerResult<u64>;

    /// All records in ascending insertion order
    async fn list_ordered(&self) -> LedgerResult<Vec<ExecutionRecord>>;

    /// All records whose last attempt failed
    async fn find_failed(&self) -> LedgerResult<Vec<ExecutionRecord>>;

    /// The most recently inserted record, if any
    async fn latest(&self) -> LedgerResult<Option<ExecutionRecord>>;

    /// The record for an exact file name, if any
    async fn find_by_name(&self, file_name: &str) -> LedgerResult<Option<ExecutionRecord>>;

    /// Insert a new record, returning the id assigned by the store
    async fn insert(&self, execution: &Execution) -> LedgerResult<String>;

    /// Overwrite the record with the given id, keeping the id
    async fn update(&self, id: &str, execution: &Execution) -> LedgerResult<()>;

    /// Execute a script payload against the target store
    async fn apply_payload(&self, payload: &[u8]) -> LedgerResult<PayloadOutcome>;

    /// Backend identifier for logging
    fn backend(&self) -> &'static str;
}
