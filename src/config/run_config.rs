//! Per-invocation settings
//!
//! Built once from the project file and the command line, then passed down
//! explicitly. Command-line values win over the file.

use super::project_config::{ProjectConfig, TargetKind};
use crate::live::profile::{EnvironmentProfile, DEFAULT_ENDPOINT};
use crate::live::default_expectations;
use crate::models::ResourceExpectation;
use crate::reporters::OutputFormat;
use crate::validate::DEFAULT_VALIDATE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Static audit or live verification; never both in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Audit,
    Verify,
}

/// Values taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub verify: bool,
    pub verbose: bool,
    pub aws: bool,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub format: OutputFormat,
    pub skip_validate: bool,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    pub mode: Mode,
    pub verbose: bool,
    pub format: OutputFormat,
    pub validate: bool,
    pub validate_timeout: Duration,
    pub toggle_variable: String,
    pub environment: EnvironmentProfile,
    pub expectations: Vec<ResourceExpectation>,
}

impl RunConfig {
    pub fn resolve(root: impl Into<PathBuf>, file: &ProjectConfig, cli: &CliOverrides) -> Self {
        Self {
            root: root.into(),
            mode: if cli.verify { Mode::Verify } else { Mode::Audit },
            verbose: cli.verbose,
            format: cli.format,
            validate: file.audit.validate && !cli.skip_validate,
            validate_timeout: timeout_setting(
                "audit.validate_timeout_secs",
                Some(file.audit.validate_timeout_secs),
            )
            .unwrap_or(DEFAULT_VALIDATE_TIMEOUT),
            toggle_variable: file.audit.toggle_variable.clone(),
            environment: resolve_environment(file, cli),
            expectations: resolve_expectations(file),
        }
    }
}

fn resolve_environment(file: &ProjectConfig, cli: &CliOverrides) -> EnvironmentProfile {
    let settings = &file.verify;
    let use_aws = cli.aws || (settings.target == TargetKind::Aws && cli.endpoint.is_none());

    let mut profile = if use_aws {
        EnvironmentProfile::aws()
    } else {
        let endpoint = cli
            .endpoint
            .clone()
            .or_else(|| settings.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        EnvironmentProfile::localstack(endpoint)
    };

    if let Some(region) = cli.region.clone().or_else(|| settings.region.clone()) {
        profile.region = region;
    }
    if let Some(timeout) =
        timeout_setting("verify.query_timeout_secs", settings.query_timeout_secs)
    {
        profile.query_timeout = timeout;
    }
    if let Some(timeout) =
        timeout_setting("verify.probe_timeout_secs", settings.probe_timeout_secs)
    {
        profile.probe_timeout = timeout;
    }
    if let Some(kinds) = file.unsupported_kinds() {
        profile.unsupported = kinds.into_iter().collect();
    }
    profile
}

fn resolve_expectations(file: &ProjectConfig) -> Vec<ResourceExpectation> {
    let overrides = file.expectation_overrides();
    default_expectations()
        .into_iter()
        .map(|mut expectation| {
            for (kind, ov) in &overrides {
                if *kind != expectation.kind {
                    continue;
                }
                if let Some(minimum) = ov.minimum {
                    expectation.minimum_count = minimum;
                }
                if ov.exact.is_some() {
                    expectation.exact_count = ov.exact;
                }
            }
            if let Some(exact) = expectation.exact_count {
                if exact < expectation.minimum_count {
                    warn!(
                        "Ignoring expectations.{}.exact = {}: below minimum {}",
                        expectation.kind.key(),
                        exact,
                        expectation.minimum_count
                    );
                    expectation.exact_count = None;
                }
            }
            expectation
        })
        .collect()
}

/// A zero timeout can never succeed; treat it as unset
fn timeout_setting(name: &str, secs: Option<u64>) -> Option<Duration> {
    match secs? {
        0 => {
            warn!("Ignoring {} = 0; using the default", name);
            None
        }
        secs => Some(Duration::from_secs(secs)),
    }
}
