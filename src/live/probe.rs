//! Pre-flight reachability probe
//!
//! Informational only: a failed probe is reported but the per-kind queries
//! still run and are classified on their own.

use super::profile::{EnvironmentProfile, Target};
use crate::external_tool::run_external_tool;
use crate::models::ProbeStatus;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub fn probe(profile: &EnvironmentProfile) -> ProbeStatus {
    match &profile.target {
        Target::LocalStack { endpoint } => probe_localstack(endpoint, profile.probe_timeout),
        Target::Aws => probe_aws(profile),
    }
}

pub fn health_url(endpoint: &str) -> String {
    format!("{}/_localstack/health", endpoint.trim_end_matches('/'))
}

fn probe_localstack(endpoint: &str, timeout: Duration) -> ProbeStatus {
    let agent = ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent();

    let url = health_url(endpoint);
    debug!("Probing {}", url);
    match agent.get(url.as_str()).call() {
        Ok(response) => {
            let status = response.status().as_u16();
            if status != 200 {
                return ProbeStatus::Unreachable(format!("{} answered HTTP {}", url, status));
            }
            let body = response.into_body().read_to_string().unwrap_or_default();
            ProbeStatus::Reachable(describe_health(&body))
        }
        Err(e) => ProbeStatus::Unreachable(format!("LocalStack is not reachable at {} ({})", endpoint, e)),
    }
}

/// One-line summary of a LocalStack health document
pub fn describe_health(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return "LocalStack is running".to_string();
    };
    let edition = json.get("edition").and_then(Value::as_str);
    let version = json.get("version").and_then(Value::as_str);
    match (edition, version) {
        (Some(e), Some(v)) => format!("LocalStack is running ({} {})", e, v),
        (Some(e), None) => format!("LocalStack is running ({})", e),
        (None, Some(v)) => format!("LocalStack is running ({})", v),
        (None, None) => "LocalStack is running".to_string(),
    }
}

fn probe_aws(profile: &EnvironmentProfile) -> ProbeStatus {
    let cmd: Vec<String> = [
        "aws",
        "--region",
        profile.region.as_str(),
        "--output",
        "json",
        "sts",
        "get-caller-identity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let result = run_external_tool(&cmd, "AWS CLI", profile.probe_timeout.max(Duration::from_secs(10)), None, None);

    if result.not_installed {
        return ProbeStatus::Unreachable("AWS CLI not installed".to_string());
    }
    if !result.exited_ok() {
        let detail = result
            .error
            .clone()
            .or_else(|| result.stderr.lines().map(str::trim).find(|l| !l.is_empty()).map(String::from))
            .unwrap_or_else(|| "credentials not configured".to_string());
        return ProbeStatus::Unreachable(format!("AWS credentials check failed: {}", detail));
    }
    let arn = result
        .json_output()
        .and_then(|v| v.get("Arn").and_then(Value::as_str).map(String::from));
    match arn {
        Some(arn) => ProbeStatus::Reachable(format!("Authenticated as {}", arn)),
        None => ProbeStatus::Reachable("AWS credentials configured".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url() {
        assert_eq!(
            health_url("http://localhost:4566/"),
            "http://localhost:4566/_localstack/health"
        );
    }

    #[test]
    fn test_describe_health() {
        let body = r#"{"services": {"ec2": "running"}, "edition": "community", "version": "3.8.1"}"#;
        assert_eq!(describe_health(body), "LocalStack is running (community 3.8.1)");
        assert_eq!(describe_health("not json"), "LocalStack is running");
    }

    #[test]
    fn test_unreachable_endpoint() {
        // Port 9 (discard) is closed on test hosts; connection is refused fast.
        let mut profile = EnvironmentProfile::localstack("http://127.0.0.1:9");
        profile.probe_timeout = Duration::from_secs(2);
        assert!(!probe(&profile).is_reachable());
    }
}
