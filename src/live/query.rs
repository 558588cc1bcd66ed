//! Live environment query primitive

use super::profile::{EnvironmentProfile, Target};
use super::resources::{extract_records, query_spec};
use crate::external_tool::{run_external_tool, ExternalToolResult};
use crate::models::{ResourceKind, ResourceObservation};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Why a listing call produced no observation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0} not installed")]
    NotInstalled(String),

    #[error("query timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("exit code {code}: {detail}")]
    Status { code: i32, detail: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One read-only listing call per resource kind
pub trait ResourceLister {
    fn list(&self, kind: ResourceKind) -> Result<ResourceObservation, QueryError>;
}

/// Lists resources through the AWS CLI
#[derive(Debug, Clone)]
pub struct AwsCliLister {
    profile: EnvironmentProfile,
}

impl AwsCliLister {
    pub fn new(profile: &EnvironmentProfile) -> Self {
        Self {
            profile: profile.clone(),
        }
    }

    /// Full command line for a kind
    pub fn command(&self, kind: ResourceKind) -> Vec<String> {
        let spec = query_spec(kind);
        let mut cmd = vec!["aws".to_string()];
        if let Target::LocalStack { endpoint } = &self.profile.target {
            cmd.push("--endpoint-url".to_string());
            cmd.push(endpoint.clone());
        }
        cmd.extend(
            [
                "--region",
                self.profile.region.as_str(),
                "--output",
                "json",
                spec.service,
                spec.action,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        cmd.extend(spec.extra_args.iter().map(|s| s.to_string()));
        cmd
    }

    /// Extra environment for the CLI. LocalStack accepts any credentials, so
    /// test values are seeded when the caller has none; real AWS relies on
    /// whatever the environment already provides.
    pub fn environment(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("AWS_PAGER".to_string(), String::new());
        if self.profile.is_local() {
            let defaults = [
                ("AWS_ACCESS_KEY_ID", "test"),
                ("AWS_SECRET_ACCESS_KEY", "test"),
                ("AWS_DEFAULT_REGION", self.profile.region.as_str()),
            ];
            for (key, value) in defaults {
                if std::env::var_os(key).is_none() {
                    env.insert(key.to_string(), value.to_string());
                }
            }
        }
        env
    }
}

impl ResourceLister for AwsCliLister {
    fn list(&self, kind: ResourceKind) -> Result<ResourceObservation, QueryError> {
        let result = run_external_tool(
            &self.command(kind),
            "AWS CLI",
            self.profile.query_timeout,
            None,
            Some(&self.environment()),
        );
        observation_from(kind, &result, self.profile.query_timeout.as_secs())
    }
}

/// Turn a finished CLI run into an observation or a classified failure
pub fn observation_from(
    kind: ResourceKind,
    result: &ExternalToolResult,
    timeout_secs: u64,
) -> Result<ResourceObservation, QueryError> {
    if result.not_installed {
        return Err(QueryError::NotInstalled("AWS CLI".to_string()));
    }
    if result.timed_out {
        return Err(QueryError::Timeout(timeout_secs));
    }
    if !result.success {
        return Err(QueryError::Transport(
            result.error.clone().unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    match result.return_code {
        Some(0) => {}
        code => {
            let detail = result
                .stderr
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("no error output")
                .to_string();
            return Err(QueryError::Status {
                code: code.unwrap_or(-1),
                detail,
            });
        }
    }

    let json = result
        .json_output()
        .ok_or_else(|| QueryError::Malformed("response is not JSON".to_string()))?;
    let records = extract_records(kind, &json).map_err(QueryError::Malformed)?;
    debug!("{}: {} record(s)", kind, records.len());
    Ok(ResourceObservation::from_records(kind, records))
}
