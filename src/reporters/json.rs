//! JSON reporter
//!
//! Outputs the full report as pretty-printed JSON for piping to jq or CI.

use anyhow::Result;
use serde::Serialize;

/// Render any report as JSON
pub fn render<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
