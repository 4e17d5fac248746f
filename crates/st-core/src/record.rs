//! Ledger execution records.
//!
//! One [`ExecutionRecord`] exists per script ever attempted against the target
//! store. A record is created on the first attempt and is only ever rewritten
//! while it is the single failed record at the tail of the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::compute_checksum;
use crate::script::ScriptDescriptor;
use crate::serde_helpers::millis_timestamp;

/// Body of a ledger record, as inserted or written over an existing id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Relative path of the script at the time it was executed
    pub file_name: String,

    /// Hex digest of the script content at execution time
    pub checksum: String,

    /// Timestamp of the (last) execution attempt
    #[serde(with = "millis_timestamp")]
    pub executed_at: DateTime<Utc>,

    /// Outcome of the last execution attempt
    pub succeeded: bool,
}

impl Execution {
    /// Build the record body for an attempt of `script` that just finished
    pub fn for_script(script: &ScriptDescriptor, succeeded: bool) -> Self {
        Self {
            file_name: script.relative_path.clone(),
            checksum: compute_checksum(&script.content),
            executed_at: Utc::now(),
            succeeded,
        }
    }

    /// Attach the store-assigned identifier
    pub fn with_id(self, id: impl Into<String>) -> ExecutionRecord {
        ExecutionRecord {
            id: id.into(),
            file_name: self.file_name,
            checksum: self.checksum,
            executed_at: self.executed_at,
            succeeded: self.succeeded,
        }
    }
}

/// A stored ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    /// Opaque identifier assigned by the ledger on insert
    pub id: String,

    pub file_name: String,

    pub checksum: String,

    pub executed_at: DateTime<Utc>,

    pub succeeded: bool,
}

impl ExecutionRecord {
    /// The record body without its identifier
    pub fn execution(&self) -> Execution {
        Execution {
            file_name: self.file_name.clone(),
            checksum: self.checksum.clone(),
            executed_at: self.executed_at,
            succeeded: self.succeeded,
        }
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
