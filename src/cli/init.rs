//! Init command - write a default tiercheck.toml

use crate::config::CONFIG_FILE;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = r#"# tiercheck configuration
# Every setting is optional; the values below are the defaults.

[audit]
# Variable whose `default = true` switches scoring to the ECS path
toggle_variable = "use_ecs"

# Run `terraform validate -json` after scoring
validate = true
validate_timeout_secs = 60

[verify]
# "localstack" or "aws"
target = "localstack"
endpoint = "http://localhost:4566"
region = "us-east-1"
query_timeout_secs = 15
probe_timeout_secs = 5

# Kinds reported as UNAVAILABLE instead of MISSING when their query fails.
# LocalStack Community does not serve elbv2 or rds.
unsupported = ["load_balancers", "target_groups", "db_instances"]

# Expected resource counts. `exact` downgrades an over-count to PARTIAL.
[expectations.vpcs]
minimum = 1

[expectations.subnets]
minimum = 6

[expectations.security_groups]
minimum = 4

[expectations.load_balancers]
minimum = 1

[expectations.target_groups]
minimum = 1

[expectations.instances]
minimum = 2

[expectations.db_instances]
minimum = 1
"#;

/// Run the init command
pub fn run(root: &Path, force: bool) -> Result<()> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
