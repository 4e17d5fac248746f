//! st-ledger - Ledger access layer for Strata
//!
//! This crate provides the `LedgerClient` trait through which the engine reads
//! and writes the execution history, plus implementations for
//! Elasticsearch-compatible stores and an in-memory store.

pub mod elasticsearch;
pub mod error;
pub mod memory;
pub mod traits;

pub use elasticsearch::ElasticsearchLedger;
pub use error::{LedgerError, LedgerResult};
pub use memory::MemoryLedger;
pub use traits::{LedgerClient, PayloadOutcome};
