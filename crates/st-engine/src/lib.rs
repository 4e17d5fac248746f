//! st-engine - Reconciliation engine for Strata
//!
//! Compares the locally discovered scripts against the execution ledger,
//! enforces the ledger invariants, retries the single permitted failed script
//! and applies whatever has never been recorded.

pub mod error;
pub mod invariant;
pub mod plan;
pub mod reconcile;
pub mod status;

pub use error::{EngineError, EngineResult};
pub use invariant::{align_ties, Check, Violation};
pub use plan::{plan, Plan, Retry};
pub use reconcile::reconcile;
pub use status::{status, ScriptState, ScriptStatus};
