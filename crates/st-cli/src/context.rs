//! Runtime context for CLI commands

use anyhow::{Context, Result};
use st_core::{Config, ScriptDescriptor, ScriptSource, StoreConfig};
use st_ledger::{ElasticsearchLedger, LedgerClient};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Runtime context containing the loaded configuration and store connection
pub struct RuntimeContext {
    /// Script discovery rooted at the configured scripts directory
    pub scripts: ScriptSource,

    /// Ledger connection for the selected target
    pub ledger: Arc<dyn LedgerClient>,

    /// Resolved store settings, after target and password overrides
    pub store: StoreConfig,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let project_path = Path::new(&args.project_dir);

        // Load config from custom path or project directory
        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(project_path).context("Failed to load project configuration")?
        };

        let store = resolve_store(&config, args)?;
        let scripts = ScriptSource::new(
            config.scripts_dir_absolute(project_path),
            &config.scripts,
        );
        let ledger: Arc<dyn LedgerClient> = Arc::new(
            ElasticsearchLedger::new(&store).context("Failed to create store client")?,
        );

        log::debug!(
            "Using ledger index {} on {}",
            store.index,
            store.base_url()
        );

        Ok(Self {
            scripts,
            ledger,
            store,
        })
    }

    /// Read the scripts directory in execution order
    pub fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>> {
        self.scripts.list().with_context(|| {
            format!(
                "Failed to read scripts from {}",
                self.scripts.root().display()
            )
        })
    }
}

/// Pick the store settings for the selected target and apply the password
/// override
pub(crate) fn resolve_store(config: &Config, args: &GlobalArgs) -> Result<StoreConfig> {
    let target = Config::resolve_target(args.target.as_deref());
    let mut store = config
        .get_store_config(target.as_deref())
        .context("Failed to resolve target")?;
    if let Some(password) = &args.password {
        store.password = Some(password.clone());
    }
    Ok(store)
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
