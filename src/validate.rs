//! Syntax validation through `terraform validate -json`

use crate::external_tool::{run_external_tool, ExternalToolResult};
use crate::models::SyntaxStatus;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_VALIDATE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ValidateOutput {
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Deserialize)]
struct Diagnostic {
    #[serde(default)]
    summary: Option<String>,
}

/// Run the validator in `root`
pub fn run_terraform_validate(root: &Path, timeout: Duration) -> SyntaxStatus {
    let cmd: Vec<String> = ["terraform", "validate", "-json"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let result = run_external_tool(&cmd, "Terraform", timeout, Some(root), None);
    let status = interpret(&result);
    debug!("terraform validate: {:?}", status);
    status
}

/// Map a validator run onto the tri-state result
pub fn interpret(result: &ExternalToolResult) -> SyntaxStatus {
    if result.not_installed {
        return SyntaxStatus::Unknown("Terraform not installed".to_string());
    }
    if !result.success {
        return SyntaxStatus::Unknown(
            result
                .error
                .clone()
                .unwrap_or_else(|| "Terraform validate did not complete".to_string()),
        );
    }
    if result.return_code == Some(0) {
        return SyntaxStatus::Valid("Terraform configuration is valid".to_string());
    }

    match serde_json::from_str::<ValidateOutput>(&result.stdout) {
        Ok(output) => {
            let errors: Vec<String> = output
                .diagnostics
                .into_iter()
                .map(|d| d.summary.unwrap_or_else(|| "Unknown error".to_string()))
                .collect();
            if errors.is_empty() {
                SyntaxStatus::Invalid(vec!["Validation failed".to_string()])
            } else {
                SyntaxStatus::Invalid(errors)
            }
        }
        Err(_) => {
            let stderr = result.stderr.trim();
            if stderr.is_empty() {
                SyntaxStatus::Invalid(vec!["Validation failed".to_string()])
            } else {
                SyntaxStatus::Invalid(vec![stderr.to_string()])
            }
        }
    }
}
