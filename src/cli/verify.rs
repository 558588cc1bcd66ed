//! Live verification command

use crate::config::RunConfig;
use crate::live::run_verification;
use crate::reporters::render_verification;
use anyhow::Result;
use tracing::info;

/// Print the verification; exit code 0 when no countable kind is short
pub fn run_verify(config: &RunConfig) -> Result<i32> {
    info!("Verifying {}", config.environment.target);
    let report = run_verification(&config.environment, &config.expectations);
    println!(
        "{}",
        render_verification(&report, config.format, config.verbose)?
    );
    Ok(if report.passed() { 0 } else { 1 })
}
