//! Configuration types and parsing for strata.yml

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Main project configuration from strata.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where migration scripts live and how they are recognised
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Target document store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    /// Each target can override the store connection
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Script discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Scripts root, relative to the project directory
    #[serde(default = "default_scripts_dir")]
    pub dir: String,

    /// Recognised script file extension (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// How strictly file names must follow `<index>_<description>`
    #[serde(default)]
    pub naming: NamingRule,

    /// How discovered scripts are ordered
    #[serde(default)]
    pub ordering: OrderingRule,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_scripts_dir(),
            extension: default_extension(),
            naming: NamingRule::default(),
            ordering: OrderingRule::default(),
        }
    }
}

/// File name acceptance rule for scripts and script directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NamingRule {
    /// `10.json` and `10_add_books.json` are both accepted
    #[default]
    Lenient,
    /// Only `10_add_books.json` is accepted
    Strict,
}

/// Ordering rule for discovered scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderingRule {
    /// Byte-wise comparison of the relative path (`1, 10, 2`)
    #[default]
    Lexical,
    /// Numeric comparison of each path component's index (`1, 2, 10`)
    Numeric,
}

/// Transport protocol for the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// Document store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub protocol: Protocol,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Name of the collection holding the execution ledger
    #[serde(default = "default_index")]
    pub index: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Skip certificate verification for https stores
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long the store may take to report yellow health after the ledger
    /// collection is created (store time unit syntax, e.g. `30s`)
    #[serde(default = "default_health_timeout")]
    pub health_timeout: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            host: default_host(),
            port: default_port(),
            index: default_index(),
            username: None,
            password: None,
            accept_invalid_certs: false,
            timeout_secs: default_timeout_secs(),
            health_timeout: default_health_timeout(),
        }
    }
}

impl StoreConfig {
    /// Base URL of the store, e.g. `http://localhost:9200`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Basic-auth credentials, present only when both parts are non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    fn validate(&self, context: &str) -> CoreResult<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: format!("{context}: store host cannot be empty"),
            });
        }
        if self.port == 0 {
            return Err(CoreError::ConfigInvalid {
                message: format!("{context}: store port cannot be 0"),
            });
        }
        if self.index.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: format!("{context}: ledger index name cannot be empty"),
            });
        }
        if !time_unit_pattern().is_match(&self.health_timeout) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "{context}: health_timeout '{}' must look like 500ms, 30s or 2m",
                    self.health_timeout
                ),
            });
        }
        Ok(())
    }
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Store configuration override
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

fn default_scripts_dir() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_index() -> String {
    "strata".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_health_timeout() -> String {
    "30s".to_string()
}

fn time_unit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+(ms|s|m)$").expect("valid regex"))
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for strata.yml or strata.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("strata.yml");
        let yaml_path = dir.join("strata.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.scripts.dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "scripts.dir cannot be empty".to_string(),
            });
        }
        let extension = self.scripts.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "scripts.extension cannot be empty".to_string(),
            });
        }

        self.store.validate("store")?;
        for (name, target) in &self.targets {
            if let Some(store) = &target.store {
                store.validate(&format!("targets.{name}.store"))?;
            }
        }
        Ok(())
    }

    /// Absolute scripts root relative to a project root
    pub fn scripts_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.scripts.dir)
    }

    /// Get all available target names
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get store configuration, optionally applying target overrides
    ///
    /// If target is specified and exists, uses the target's store config.
    /// Otherwise, uses the base store config.
    pub fn get_store_config(&self, target: Option<&str>) -> CoreResult<StoreConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::UnknownTarget {
                            name: name.to_string(),
                            available: self.available_targets().join(", "),
                        })?;

                Ok(target_config
                    .store
                    .clone()
                    .unwrap_or_else(|| self.store.clone()))
            }
            None => Ok(self.store.clone()),
        }
    }

    /// Resolve target from CLI flag or STRATA_TARGET environment variable
    ///
    /// Priority: CLI flag > STRATA_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var("STRATA_TARGET").ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
