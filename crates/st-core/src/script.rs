//! Migration script discovery.
//!
//! Scripts live under a single root directory. Entries directly under the root
//! are considered: files are taken as-is and directories are expanded exactly
//! one level. Every accepted name starts with an integer index; anything else
//! is skipped with a warning.

use crate::checksum::compute_checksum;
use crate::config::{NamingRule, OrderingRule, ScriptsConfig};
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// One migration unit found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    /// Leading integer index of the file name
    pub order_key: u64,

    /// Path relative to the scripts root, always `/`-separated
    pub relative_path: String,

    /// Raw script bytes, executed as-is by the target store
    pub content: Vec<u8>,
}

impl ScriptDescriptor {
    /// Checksum of the current content
    pub fn checksum(&self) -> String {
        compute_checksum(&self.content)
    }
}

/// Find a script by its relative path
pub fn match_by_name<'a>(
    scripts: &'a [ScriptDescriptor],
    name: &str,
) -> Option<&'a ScriptDescriptor> {
    scripts.iter().find(|s| s.relative_path == name)
}

/// Discovers and orders the scripts under a root directory
#[derive(Debug, Clone)]
pub struct ScriptSource {
    root: PathBuf,
    extension: String,
    naming: NamingRule,
    ordering: OrderingRule,
}

/// An accepted entry before its content is read
struct Candidate {
    path: PathBuf,
    relative_path: String,
    /// Index of each path component, outermost first
    keys: Vec<u64>,
}

impl ScriptSource {
    /// Create a source rooted at `root` using the discovery settings
    pub fn new(root: impl Into<PathBuf>, config: &ScriptsConfig) -> Self {
        Self {
            root: root.into(),
            extension: config.extension.trim_start_matches('.').to_string(),
            naming: config.naming,
            ordering: config.ordering,
        }
    }

    /// The scripts root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List scripts in execution order.
    ///
    /// Re-reads the filesystem on every call.
    pub fn list(&self) -> CoreResult<Vec<ScriptDescriptor>> {
        if !self.root.exists() {
            return Err(CoreError::ScriptsDirNotFound {
                path: self.root.display().to_string(),
            });
        }

        let mut candidates = Vec::new();
        for (path, name) in read_entries(&self.root)? {
            if path.is_dir() {
                let Some(dir_key) = parse_index(&name, self.naming) else {
                    log::warn!(
                        "Ignoring directory {}. Name must start with an index number followed by an underscore and a description.",
                        name
                    );
                    continue;
                };
                for (child, child_name) in read_entries(&path)? {
                    if child.is_dir() {
                        log::warn!(
                            "Ignoring directory {}/{}. Only one level of subdirectories is scanned.",
                            name,
                            child_name
                        );
                        continue;
                    }
                    if let Some(file_key) = self.accept_file(&child, &child_name) {
                        candidates.push(Candidate {
                            path: child,
                            relative_path: format!("{}/{}", name, child_name),
                            keys: vec![dir_key, file_key],
                        });
                    }
                }
            } else if let Some(file_key) = self.accept_file(&path, &name) {
                candidates.push(Candidate {
                    path,
                    relative_path: name,
                    keys: vec![file_key],
                });
            }
        }

        candidates.sort_by(|a, b| self.compare(a, b));

        candidates
            .into_iter()
            .map(|c| {
                let content = std::fs::read(&c.path).map_err(|e| CoreError::IoWithPath {
                    path: c.path.display().to_string(),
                    source: e,
                })?;
                Ok(ScriptDescriptor {
                    order_key: c.keys.last().copied().unwrap_or_default(),
                    relative_path: c.relative_path,
                    content,
                })
            })
            .collect()
    }

    /// Returns the file's index when it passes the extension and naming rules
    fn accept_file(&self, path: &Path, name: &str) -> Option<u64> {
        if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            log::warn!(
                "Ignoring script {}. File name must have .{} extension.",
                name,
                self.extension
            );
            return None;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let index = parse_index(stem, self.naming);
        if index.is_none() {
            log::warn!(
                "Ignoring script {}. File name must start with an index number followed by an underscore and a description.",
                name
            );
        }
        index
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match self.ordering {
            OrderingRule::Lexical => a.relative_path.cmp(&b.relative_path),
            OrderingRule::Numeric => a
                .keys
                .cmp(&b.keys)
                .then_with(|| a.relative_path.cmp(&b.relative_path)),
        }
    }
}

/// Directory entries with UTF-8 names; others are skipped with a warning
fn read_entries(dir: &Path) -> CoreResult<Vec<(PathBuf, String)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut result = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        match entry.file_name().into_string() {
            Ok(name) => result.push((path, name)),
            Err(raw) => log::warn!("Ignoring script {:?}. File name is not valid UTF-8.", raw),
        }
    }
    Ok(result)
}

/// Parse the leading index of a base name (extension already removed)
pub(crate) fn parse_index(name: &str, naming: NamingRule) -> Option<u64> {
    static LENIENT: OnceLock<Regex> = OnceLock::new();
    static STRICT: OnceLock<Regex> = OnceLock::new();

    let pattern = match naming {
        NamingRule::Lenient => {
            LENIENT.get_or_init(|| Regex::new(r"^([0-9]+)(?:_|$)").expect("valid regex"))
        }
        NamingRule::Strict => {
            STRICT.get_or_init(|| Regex::new(r"^([0-9]+)_").expect("valid regex"))
        }
    };
    pattern
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
