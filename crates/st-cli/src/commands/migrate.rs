//! Migrate command implementation

use anyhow::{Context, Result};
use st_engine::reconcile;

use crate::cli::GlobalArgs;
use crate::commands::common::scripts_label;
use crate::context::RuntimeContext;

/// Execute the migrate command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts = ctx.list_scripts()?;

    let applied = reconcile(&scripts, ctx.ledger.as_ref())
        .await
        .with_context(|| format!("Migration against {} failed", ctx.store.base_url()))?;

    if applied == 0 {
        println!("No new script to apply");
    } else {
        println!(
            "Applied {} {} to {}",
            applied,
            scripts_label(applied),
            ctx.store.base_url()
        );
    }
    Ok(())
}
