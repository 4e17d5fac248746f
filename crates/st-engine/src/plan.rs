//! Read-only reconciliation planning.
//!
//! Reads the ledger summary, checks every invariant and works out what a run
//! would do, without writing anything.

use crate::error::{EngineError, EngineResult};
use crate::invariant::{align_ties, check_failed_records, sweep};
use st_core::{match_by_name, ExecutionRecord, ScriptDescriptor};
use st_ledger::LedgerClient;

/// The failed tail record and the local script that will replace it
#[derive(Debug, Clone)]
pub struct Retry<'a> {
    pub record: ExecutionRecord,
    pub script: &'a ScriptDescriptor,
}

/// What a reconciliation run has to do
#[derive(Debug, Clone, Default)]
pub struct Plan<'a> {
    /// The single failed record to re-apply, if any
    pub retry: Option<Retry<'a>>,

    /// Scripts never recorded, in execution order
    pub pending: Vec<&'a ScriptDescriptor>,

    /// Number of recorded scripts that succeeded
    pub applied: usize,

    /// The ledger holds no records yet
    pub fresh: bool,
}

impl Plan<'_> {
    /// Nothing to retry and nothing to apply
    pub fn is_up_to_date(&self) -> bool {
        self.retry.is_none() && self.pending.is_empty()
    }
}

/// Work out what [`reconcile`](crate::reconcile) would do, without mutating
/// the ledger.
///
/// A missing ledger collection is treated as an empty ledger and is not
/// created. An empty script list never touches the ledger.
pub async fn plan<'a>(
    scripts: &'a [ScriptDescriptor],
    ledger: &dyn LedgerClient,
) -> EngineResult<Plan<'a>> {
    if scripts.is_empty() {
        return Ok(Plan::default());
    }
    if !ledger.collection_exists().await? {
        return Ok(fresh_plan(scripts));
    }
    inspect(scripts, ledger).await
}

fn fresh_plan(scripts: &[ScriptDescriptor]) -> Plan<'_> {
    Plan {
        retry: None,
        pending: scripts.iter().collect(),
        applied: 0,
        fresh: true,
    }
}

/// Read the ledger of an existing collection and check it against `scripts`
pub(crate) async fn inspect<'a>(
    scripts: &'a [ScriptDescriptor],
    ledger: &dyn LedgerClient,
) -> EngineResult<Plan<'a>> {
    if ledger.count().await? == 0 {
        return Ok(fresh_plan(scripts));
    }

    let failed = ledger.find_failed().await?;
    // The store breaks timestamp ties by name; re-align them with the local
    // order before anything positional, including picking the latest record
    let records = align_ties(ledger.list_ordered().await?, scripts);
    let candidate = check_failed_records(failed, records.last()).into_result()?;

    let retry_id = candidate.as_ref().map(|r| r.id.as_str());
    let recorded = sweep(&records, scripts, retry_id).into_result()?;

    let retry = match candidate {
        Some(record) => {
            let script = match_by_name(scripts, &record.file_name).ok_or_else(|| {
                EngineError::MissingScript {
                    file_name: record.file_name.clone(),
                }
            })?;
            Some(Retry { record, script })
        }
        None => None,
    };

    Ok(Plan {
        applied: recorded - usize::from(retry.is_some()),
        retry,
        pending: scripts[recorded..].iter().collect(),
        fresh: false,
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
