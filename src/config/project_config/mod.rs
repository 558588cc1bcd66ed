//! Project-level configuration support
//!
//! Loads per-project configuration from `tiercheck.toml` or
//! `.tiercheckrc.json` in the audited directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # tiercheck.toml
//!
//! [audit]
//! toggle_variable = "use_ecs"
//! validate = true
//! validate_timeout_secs = 60
//!
//! [verify]
//! target = "localstack"          # or "aws"
//! endpoint = "http://localhost:4566"
//! region = "us-east-1"
//! query_timeout_secs = 15
//! probe_timeout_secs = 5
//! unsupported = ["load_balancers", "target_groups", "db_instances"]
//!
//! [expectations.subnets]
//! minimum = 6
//!
//! [expectations.instances]
//! minimum = 2
//! exact = 4
//! ```

use crate::audit::DEFAULT_TOGGLE_VARIABLE;
use crate::models::ResourceKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "tiercheck.toml";
pub const JSON_CONFIG_FILE: &str = ".tiercheckrc.json";

/// Why a configuration file could not be used
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported config format: {0} (use .toml or .json)")]
    UnknownFormat(PathBuf),
}

/// Static audit settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuditSettings {
    /// Variable whose `default = true` enables the containerized path
    #[serde(default = "default_toggle_variable")]
    pub toggle_variable: String,

    /// Run `terraform validate` (default: true)
    #[serde(default = "default_validate")]
    pub validate: bool,

    #[serde(default = "default_validate_timeout")]
    pub validate_timeout_secs: u64,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            toggle_variable: default_toggle_variable(),
            validate: default_validate(),
            validate_timeout_secs: default_validate_timeout(),
        }
    }
}

fn default_toggle_variable() -> String {
    DEFAULT_TOGGLE_VARIABLE.to_string()
}
fn default_validate() -> bool {
    true
}
fn default_validate_timeout() -> u64 {
    crate::validate::DEFAULT_VALIDATE_TIMEOUT.as_secs()
}

/// Which environment live verification talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Localstack,
    Aws,
}

/// Live verification settings; unset fields fall back to the target's defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifySettings {
    #[serde(default)]
    pub target: TargetKind,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub query_timeout_secs: Option<u64>,

    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,

    /// Replaces the target's unsupported set when present
    #[serde(default)]
    pub unsupported: Option<Vec<String>>,
}

/// Per-kind expectation override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExpectationOverride {
    #[serde(default)]
    pub minimum: Option<usize>,

    #[serde(default)]
    pub exact: Option<usize>,
}

/// Project-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub audit: AuditSettings,

    #[serde(default)]
    pub verify: VerifySettings,

    /// Keyed by resource kind (`subnets`, `security-groups`, ...)
    #[serde(default)]
    pub expectations: BTreeMap<String, ExpectationOverride>,
}

impl ProjectConfig {
    /// Parsed `verify.unsupported`, dropping names that are not resource kinds
    pub fn unsupported_kinds(&self) -> Option<Vec<ResourceKind>> {
        let names = self.verify.unsupported.as_ref()?;
        Some(
            names
                .iter()
                .filter_map(|name| match name.parse::<ResourceKind>() {
                    Ok(kind) => Some(kind),
                    Err(e) => {
                        warn!("Ignoring verify.unsupported entry: {}", e);
                        None
                    }
                })
                .collect(),
        )
    }

    /// Parsed `[expectations.*]` overrides, dropping unknown kinds
    pub fn expectation_overrides(&self) -> Vec<(ResourceKind, ExpectationOverride)> {
        self.expectations
            .iter()
            .filter_map(|(name, ov)| match name.parse::<ResourceKind>() {
                Ok(kind) => Some((kind, *ov)),
                Err(e) => {
                    warn!("Ignoring [expectations.{}]: {}", name, e);
                    None
                }
            })
            .collect()
    }
}

/// Load project configuration from the audited directory.
///
/// Searches for `tiercheck.toml`, then `.tiercheckrc.json`. A file that fails
/// to load is logged and skipped. Returns defaults if nothing usable is found.
pub fn load_project_config(root: &Path) -> ProjectConfig {
    for name in [CONFIG_FILE, JSON_CONFIG_FILE] {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("{}; using defaults", e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load one configuration file, choosing the parser by extension
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::UnknownFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests;
