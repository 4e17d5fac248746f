//! Per-script status report.
//!
//! Unlike [`plan`](crate::plan::plan), the report never fails on drift: it shows
//! every local script and every recorded one, flagging what is out of line.

use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use st_core::{match_by_name, ScriptDescriptor};
use st_ledger::LedgerClient;

/// State of one script relative to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptState {
    /// Recorded as succeeded, content unchanged
    Applied,
    /// Last attempt failed; the next run retries it
    Failed,
    /// Recorded as succeeded, but the local content differs
    Changed,
    /// Not recorded yet
    Pending,
    /// Recorded, but no longer present locally
    Missing,
}

impl std::fmt::Display for ScriptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptState::Applied => write!(f, "applied"),
            ScriptState::Failed => write!(f, "failed"),
            ScriptState::Changed => write!(f, "changed"),
            ScriptState::Pending => write!(f, "pending"),
            ScriptState::Missing => write!(f, "missing"),
        }
    }
}

/// One row of the status report
#[derive(Debug, Clone, Serialize)]
pub struct ScriptStatus {
    pub file_name: String,
    pub state: ScriptState,
    /// Last execution attempt, for recorded scripts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// Describe every local and recorded script.
///
/// Local scripts come first in execution order, followed by recorded scripts
/// that no longer exist locally, in ledger order. Reads only.
pub async fn status(
    scripts: &[ScriptDescriptor],
    ledger: &dyn LedgerClient,
) -> EngineResult<Vec<ScriptStatus>> {
    let records = if ledger.collection_exists().await? {
        ledger.list_ordered().await?
    } else {
        Vec::new()
    };

    let mut rows: Vec<ScriptStatus> = scripts
        .iter()
        .map(|script| {
            match records.iter().find(|r| r.file_name == script.relative_path) {
                Some(record) => {
                    let state = if !record.succeeded {
                        ScriptState::Failed
                    } else if record.checksum != script.checksum() {
                        ScriptState::Changed
                    } else {
                        ScriptState::Applied
                    };
                    ScriptStatus {
                        file_name: script.relative_path.clone(),
                        state,
                        executed_at: Some(record.executed_at),
                    }
                }
                None => ScriptStatus {
                    file_name: script.relative_path.clone(),
                    state: ScriptState::Pending,
                    executed_at: None,
                },
            }
        })
        .collect();

    rows.extend(
        records
            .iter()
            .filter(|r| match_by_name(scripts, &r.file_name).is_none())
            .map(|r| ScriptStatus {
                file_name: r.file_name.clone(),
                state: ScriptState::Missing,
                executed_at: Some(r.executed_at),
            }),
    );

    Ok(rows)
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
