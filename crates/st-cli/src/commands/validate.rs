//! Validate command implementation

use anyhow::{Context, Result};
use st_engine::{plan, Plan};

use crate::cli::GlobalArgs;
use crate::commands::common::scripts_label;
use crate::context::RuntimeContext;

/// Execute the validate command
///
/// Runs every ledger check a migration would run, then reports what it would
/// do. Never writes to the store.
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts = ctx.list_scripts()?;

    let plan = plan(&scripts, ctx.ledger.as_ref())
        .await
        .context("Validation failed")?;

    for line in summarize(&plan) {
        println!("{}", line);
    }
    Ok(())
}

/// Human-readable lines describing a plan
pub(crate) fn summarize(plan: &Plan<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    if plan.is_up_to_date() {
        lines.push(format!(
            "Ledger is up to date ({} {} applied)",
            plan.applied,
            scripts_label(plan.applied)
        ));
        return lines;
    }

    if let Some(retry) = &plan.retry {
        lines.push(format!("  retry    {}", retry.script.relative_path));
    }
    for script in &plan.pending {
        lines.push(format!("  pending  {}", script.relative_path));
    }

    let pending = plan.pending.len() + usize::from(plan.retry.is_some());
    lines.push(format!(
        "{} applied, {} {} to run",
        plan.applied,
        pending,
        scripts_label(pending)
    ));
    lines
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
