//! Configuration module for tiercheck
//!
//! This module handles:
//! - Project-level configuration (tiercheck.toml)
//! - Live target and expectation overrides
//! - Resolution of one RunConfig per invocation

mod project_config;
mod run_config;

pub use project_config::{
    load_config_file, load_project_config, AuditSettings, ConfigError, ExpectationOverride,
    ProjectConfig, TargetKind, VerifySettings, CONFIG_FILE, JSON_CONFIG_FILE,
};
pub use run_config::{CliOverrides, Mode, RunConfig};
