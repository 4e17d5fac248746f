//! Info command implementation

use anyhow::{Context, Result};
use st_engine::{status, ScriptState, ScriptStatus};

use crate::cli::{GlobalArgs, InfoArgs, InfoOutput};
use crate::commands::common::print_table;
use crate::context::RuntimeContext;

/// Execute the info command
pub async fn execute(args: &InfoArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let scripts = ctx.list_scripts()?;

    let rows = status(&scripts, ctx.ledger.as_ref())
        .await
        .context("Failed to read the ledger")?;

    match args.output {
        InfoOutput::Table => print_status_table(&rows),
        InfoOutput::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

fn print_status_table(rows: &[ScriptStatus]) {
    if rows.is_empty() {
        println!("No scripts found");
        return;
    }

    let table: Vec<Vec<String>> = rows.iter().map(status_row).collect();
    print_table(&["SCRIPT", "STATE", "EXECUTED AT"], &table);

    let needs_attention = rows
        .iter()
        .filter(|r| matches!(r.state, ScriptState::Changed | ScriptState::Missing))
        .count();
    if needs_attention > 0 {
        println!();
        println!(
            "{} recorded script(s) no longer match the scripts directory; migrate will refuse to run",
            needs_attention
        );
    }
}

pub(crate) fn status_row(row: &ScriptStatus) -> Vec<String> {
    vec![
        row.file_name.clone(),
        row.state.to_string(),
        row.executed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]
}

#[cfg(test)]
#[path = "info_test.rs"]
mod tests;
