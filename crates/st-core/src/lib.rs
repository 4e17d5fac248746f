//! st-core - Core library for Strata
//!
//! This crate provides the shared data model (script descriptors and ledger
//! execution records), configuration parsing, the checksum service and
//! migration script discovery used across all Strata components.

pub mod checksum;
pub mod config;
pub mod error;
pub mod record;
pub mod script;
pub(crate) mod serde_helpers;

pub use checksum::compute_checksum;
pub use config::{Config, NamingRule, OrderingRule, Protocol, ScriptsConfig, StoreConfig};
pub use error::{CoreError, CoreResult};
pub use record::{Execution, ExecutionRecord};
pub use script::{match_by_name, ScriptDescriptor, ScriptSource};
