//! Doctor command - check environment

use crate::config::RunConfig;
use crate::external_tool::is_tool_installed;
use crate::live::probe::probe;
use crate::models::ProbeStatus;
use anyhow::Result;
use console::style;

/// Returns 0 when the live environment answers, 1 otherwise
pub fn run(config: &RunConfig) -> Result<i32> {
    println!("{}\n", style("tiercheck doctor").bold());

    if is_tool_installed("terraform") {
        println!("{} terraform: installed", style("✓").green());
    } else {
        println!("{} terraform: not found", style("○").yellow());
        println!("  Syntax validation will be reported as unknown");
    }

    let has_aws = is_tool_installed("aws");
    if has_aws {
        println!("{} aws: installed", style("✓").green());
    } else {
        println!("{} aws: not found", style("✗").red());
        println!("  Install the AWS CLI to use --verify");
    }

    println!(
        "\n{} {} (region {})",
        style("Target:").cyan(),
        config.environment.target,
        config.environment.region
    );
    let status = probe(&config.environment);
    match &status {
        ProbeStatus::Reachable(message) => println!("{} {}", style("✓").green(), message),
        ProbeStatus::Unreachable(message) => println!("{} {}", style("✗").red(), message),
    }

    Ok(if has_aws && status.is_reachable() { 0 } else { 1 })
}
