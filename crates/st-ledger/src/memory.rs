//! In-memory ledger implementation
//!
//! Keeps records in insertion order behind a mutex. Payload execution is
//! delegated to a caller-supplied closure so stores that reject specific
//! scripts can be simulated.

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerClient, PayloadOutcome};
use async_trait::async_trait;
use st_core::{Execution, ExecutionRecord};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

type PayloadExecutor = Box<dyn Fn(&[u8]) -> bool + Send + Sync>;

#[derive(Default)]
struct State {
    exists: bool,
    records: Vec<ExecutionRecord>,
    payloads: Vec<Vec<u8>>,
}

/// Ledger and target store held entirely in memory
pub struct MemoryLedger {
    state: Mutex<State>,
    executor: PayloadExecutor,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// An empty store without a ledger collection; every payload succeeds
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            executor: Box::new(|_| true),
        }
    }

    /// A store whose ledger collection already holds `records`, in order.
    ///
    /// No consistency checks are applied, so broken ledgers can be modelled.
    pub fn with_records(records: Vec<ExecutionRecord>) -> Self {
        Self {
            state: Mutex::new(State {
                exists: true,
                records,
                payloads: Vec::new(),
            }),
            executor: Box::new(|_| true),
        }
    }

    /// Replace the payload executor; it returns whether a payload succeeds
    pub fn with_executor<F>(mut self, executor: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        self.executor = Box::new(executor);
        self
    }

    /// Snapshot of the ledger in insertion order
    pub fn records(&self) -> LedgerResult<Vec<ExecutionRecord>> {
        Ok(self.lock()?.records.clone())
    }

    /// Every payload executed so far, in execution order
    pub fn applied_payloads(&self) -> LedgerResult<Vec<Vec<u8>>> {
        Ok(self.lock()?.payloads.clone())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| LedgerError::MutexPoisoned(e.to_string()))
    }

    /// Lock the state, failing like a real store when the collection is absent
    fn lock_existing(&self, operation: &str) -> LedgerResult<MutexGuard<'_, State>> {
        let state = self.lock()?;
        if !state.exists {
            return Err(LedgerError::UnexpectedStatus {
                operation: operation.to_string(),
                status: 404,
                body: "ledger collection does not exist".to_string(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn collection_exists(&self) -> LedgerResult<bool> {
        Ok(self.lock()?.exists)
    }

    async fn create_collection(&self) -> LedgerResult<()> {
        self.lock()?.exists = true;
        Ok(())
    }

    async fn count(&self) -> LedgerResult<u64> {
        Ok(self.lock_existing("count")?.records.len() as u64)
    }

    async fn list_ordered(&self) -> LedgerResult<Vec<ExecutionRecord>> {
        Ok(self.lock_existing("list")?.records.clone())
    }

    async fn find_failed(&self) -> LedgerResult<Vec<ExecutionRecord>> {
        Ok(self
            .lock_existing("find failed")?
            .records
            .iter()
            .filter(|r| !r.succeeded)
            .cloned()
            .collect())
    }

    async fn latest(&self) -> LedgerResult<Option<ExecutionRecord>> {
        Ok(self.lock_existing("latest")?.records.last().cloned())
    }

    async fn find_by_name(&self, file_name: &str) -> LedgerResult<Option<ExecutionRecord>> {
        Ok(self
            .lock_existing("find by name")?
            .records
            .iter()
            .find(|r| r.file_name == file_name)
            .cloned())
    }

    async fn insert(&self, execution: &Execution) -> LedgerResult<String> {
        let mut state = self.lock_existing("insert")?;
        let id = Uuid::new_v4().to_string();
        state.records.push(execution.clone().with_id(id.clone()));
        Ok(id)
    }

    async fn update(&self, id: &str, execution: &Execution) -> LedgerResult<()> {
        let mut state = self.lock_existing("update")?;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;
        *record = execution.clone().with_id(id);
        Ok(())
    }

    async fn apply_payload(&self, payload: &[u8]) -> LedgerResult<PayloadOutcome> {
        self.lock()?.payloads.push(payload.to_vec());
        let succeeded = (self.executor)(payload);
        Ok(PayloadOutcome {
            succeeded,
            diagnostics: if succeeded { "accepted" } else { "rejected" }.to_string(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
