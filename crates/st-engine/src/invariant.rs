//! Ledger invariant checks.
//!
//! Pure functions over already fetched ledger state. They report violations
//! as values; the engine turns them into [`EngineError`]s.

use crate::error::EngineError;
use st_core::{match_by_name, ExecutionRecord, ScriptDescriptor};
use std::collections::HashSet;

/// A broken ledger invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// More than one record has `succeeded = false`
    MultipleFailures { file_names: Vec<String> },

    /// The failed record is not the most recently created one
    FailureNotAtTail { failed: String, latest: String },

    /// The same file name was recorded twice
    DuplicateRecord { file_name: String },

    /// A recorded script no longer exists locally
    MissingScript { file_name: String },

    /// A successfully applied script changed on disk
    ChecksumMismatch {
        file_name: String,
        recorded: String,
        current: String,
    },

    /// The local script at a recorded position is not the recorded script
    OrderViolation {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Outcome of an invariant check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<T> {
    Ok(T),
    Violation(Violation),
}

impl<T> Check<T> {
    /// Convert into a result, mapping violations to engine errors
    pub fn into_result(self) -> Result<T, EngineError> {
        match self {
            Check::Ok(value) => Ok(value),
            Check::Violation(violation) => Err(violation.into()),
        }
    }
}

impl From<Violation> for EngineError {
    fn from(violation: Violation) -> Self {
        match violation {
            Violation::MultipleFailures { file_names } => EngineError::InconsistentLedger {
                reason: format!(
                    "{} failed scripts recorded ({}), at most one is allowed",
                    file_names.len(),
                    file_names.join(", ")
                ),
            },
            Violation::FailureNotAtTail { failed, latest } => EngineError::InconsistentLedger {
                reason: format!(
                    "failed script {failed} must be the latest script, but {latest} was recorded after it"
                ),
            },
            Violation::DuplicateRecord { file_name } => EngineError::InconsistentLedger {
                reason: format!("script {file_name} is recorded more than once"),
            },
            Violation::MissingScript { file_name } => EngineError::MissingScript { file_name },
            Violation::ChecksumMismatch {
                file_name,
                recorded,
                current,
            } => EngineError::ChecksumMismatch {
                file_name,
                recorded,
                current,
            },
            Violation::OrderViolation {
                position,
                expected,
                found,
            } => EngineError::OrderViolation {
                position,
                expected,
                found,
            },
        }
    }
}

/// Check the failed records and pick the retry candidate.
///
/// `latest` is the most recently created record overall. Returns the single
/// failed record when it sits at the tail, `None` when nothing failed.
pub fn check_failed_records(
    mut failed: Vec<ExecutionRecord>,
    latest: Option<&ExecutionRecord>,
) -> Check<Option<ExecutionRecord>> {
    if failed.len() > 1 {
        return Check::Violation(Violation::MultipleFailures {
            file_names: failed.into_iter().map(|r| r.file_name).collect(),
        });
    }
    let Some(candidate) = failed.pop() else {
        return Check::Ok(None);
    };

    match latest {
        Some(tail) if tail.id == candidate.id => Check::Ok(Some(candidate)),
        other => Check::Violation(Violation::FailureNotAtTail {
            failed: candidate.file_name,
            latest: other
                .map(|r| r.file_name.clone())
                .unwrap_or_else(|| "nothing".to_string()),
        }),
    }
}

/// Reorder records that share an execution timestamp so they follow the
/// local script order.
///
/// Stores can only break timestamp ties on a field they know, which need not
/// agree with the configured ordering rule. Runs of equal `executed_at` are
/// stably sorted by script position; unknown names keep their place at the
/// end of their run.
pub fn align_ties(
    mut records: Vec<ExecutionRecord>,
    scripts: &[ScriptDescriptor],
) -> Vec<ExecutionRecord> {
    let position = |name: &str| {
        scripts
            .iter()
            .position(|s| s.relative_path == name)
            .unwrap_or(usize::MAX)
    };

    let mut start = 0;
    while start < records.len() {
        let mut end = start + 1;
        while end < records.len() && records[end].executed_at == records[start].executed_at {
            end += 1;
        }
        if end - start > 1 {
            records[start..end].sort_by_key(|r| position(&r.file_name));
        }
        start = end;
    }
    records
}

/// Sweep the ledger, in insertion order, against the local script sequence.
///
/// Every record must name a local script, keep its checksum (unless it is the
/// retry candidate), and occupy the same position locally. Returns the number
/// of leading scripts accounted for by the ledger.
pub fn sweep(
    records: &[ExecutionRecord],
    scripts: &[ScriptDescriptor],
    retry_id: Option<&str>,
) -> Check<usize> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        if !seen.insert(record.file_name.as_str()) {
            return Check::Violation(Violation::DuplicateRecord {
                file_name: record.file_name.clone(),
            });
        }

        let Some(script) = match_by_name(scripts, &record.file_name) else {
            return Check::Violation(Violation::MissingScript {
                file_name: record.file_name.clone(),
            });
        };

        let current = script.checksum();
        let is_retry = retry_id == Some(record.id.as_str());
        if current != record.checksum && !is_retry {
            return Check::Violation(Violation::ChecksumMismatch {
                file_name: record.file_name.clone(),
                recorded: record.checksum.clone(),
                current,
            });
        }

        // Distinct names that all resolve locally cannot outnumber the scripts
        let occupant = &scripts[position];
        if occupant.relative_path != script.relative_path {
            return Check::Violation(Violation::OrderViolation {
                position: position + 1,
                expected: record.file_name.clone(),
                found: occupant.relative_path.clone(),
            });
        }
    }

    Check::Ok(records.len())
}

#[cfg(test)]
#[path = "invariant_test.rs"]
mod tests;
