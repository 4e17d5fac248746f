//! Script application.
//!
//! A run finishes every ledger read and invariant check before the first
//! write. Writes then happen strictly one at a time: the retry first, then
//! each never-recorded script, stopping at the first failure so that at most
//! one failed record ever exists, at the tail.

use crate::error::{EngineError, EngineResult};
use crate::plan::inspect;
use st_core::{Execution, ScriptDescriptor};
use st_ledger::LedgerClient;

/// Bring the ledger up to date with `scripts`.
///
/// Returns the number of scripts that reached `succeeded = true` during this
/// run, retries included.
pub async fn reconcile(
    scripts: &[ScriptDescriptor],
    ledger: &dyn LedgerClient,
) -> EngineResult<usize> {
    if scripts.is_empty() {
        log::info!("No script, no migration");
        return Ok(0);
    }

    if !ledger.collection_exists().await? {
        log::info!(
            "Ledger collection doesn't exist on {}, creating it",
            ledger.backend()
        );
        ledger.create_collection().await?;
    }

    let plan = inspect(scripts, ledger).await?;
    let mut applied = 0;

    if let Some(retry) = &plan.retry {
        log::info!("Retrying failed script {}", retry.script.relative_path);
        apply_one(retry.script, ledger, Some(&retry.record.id)).await?;
        applied += 1;
    }

    if plan.pending.is_empty() {
        log::info!("No new script to apply");
        return Ok(applied);
    }

    for script in &plan.pending {
        // The sweep already excluded recorded names; a hit here means the
        // ledger changed underneath this run
        if !plan.fresh
            && ledger
                .find_by_name(&script.relative_path)
                .await?
                .is_some()
        {
            log::warn!(
                "Skipping script {}. It is already recorded in the ledger.",
                script.relative_path
            );
            continue;
        }
        apply_one(script, ledger, None).await?;
        applied += 1;
    }

    Ok(applied)
}

/// Execute one script and record the outcome.
///
/// The outcome is written whether or not the store accepted the payload, so a
/// failure stays visible to the next run. `existing` names the record to
/// overwrite on retry.
async fn apply_one(
    script: &ScriptDescriptor,
    ledger: &dyn LedgerClient,
    existing: Option<&str>,
) -> EngineResult<()> {
    log::info!("Executing script {}", script.relative_path);
    let outcome = ledger.apply_payload(&script.content).await?;
    if outcome.succeeded {
        log::debug!("{}: {}", script.relative_path, outcome.diagnostics);
    } else {
        log::warn!(
            "Store rejected script {}: {}",
            script.relative_path,
            outcome.diagnostics
        );
    }

    let execution = Execution::for_script(script, outcome.succeeded);
    match existing {
        Some(id) => ledger.update(id, &execution).await?,
        None => {
            ledger.insert(&execution).await?;
        }
    }

    if !outcome.succeeded {
        return Err(EngineError::ApplyFailed {
            file_name: script.relative_path.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
