//! CLI command definitions and handlers

mod audit;
mod doctor;
mod init;
mod verify;

use crate::config::{load_project_config, CliOverrides, Mode, RunConfig};
use crate::reporters::OutputFormat;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use audit::run_audit;
pub use verify::run_verify;

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s).map_err(|e| e.to_string())
}

/// tiercheck - compliance scoring for three-tier Terraform projects
#[derive(Parser, Debug)]
#[command(name = "tiercheck")]
#[command(
    version,
    about = "Score a three-tier Terraform project against its reference architecture",
    long_about = "tiercheck audits a Terraform three-tier AWS project (VPC, security groups, \
load balancer, EC2 or ECS compute, RDS) with weighted structural rules over \
comment-stripped sources, and can cross-check a live LocalStack or AWS environment.\n\n\
Exit code is 0 only for a perfect score (audit) or a clean verification (--verify).",
    after_help = "\
Examples:
  tiercheck                           Audit the current directory
  tiercheck infra/ --verbose          Show every individual check
  tiercheck --verify                  Verify resources in LocalStack
  tiercheck --verify --aws            Verify resources in real AWS
  tiercheck --format json             JSON output for scripting"
)]
pub struct Cli {
    /// Path to the Terraform project (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show every individual check
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Verify the live environment instead of auditing files
    #[arg(long)]
    pub verify: bool,

    /// Verify against real AWS instead of LocalStack
    #[arg(long, requires = "verify")]
    pub aws: bool,

    /// LocalStack endpoint URL (ignored with --aws)
    #[arg(long, env = "TIERCHECK_ENDPOINT")]
    pub endpoint: Option<String>,

    /// AWS region for live queries
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    pub region: Option<String>,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Do not run `terraform validate`
    #[arg(long)]
    pub skip_validate: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented tiercheck.toml with the default settings
    Init {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing tiercheck.toml
        #[arg(long)]
        force: bool,
    },

    /// Check for terraform and the AWS CLI, and probe the live environment
    Doctor {
        /// Project directory whose tiercheck.toml selects the environment
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Probe real AWS instead of LocalStack
        #[arg(long)]
        aws: bool,

        /// LocalStack endpoint URL (ignored with --aws)
        #[arg(long, env = "TIERCHECK_ENDPOINT")]
        endpoint: Option<String>,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            verify: self.verify,
            verbose: self.verbose,
            aws: self.aws,
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            format: self.format,
            skip_validate: self.skip_validate,
        }
    }
}

fn project_dir(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }
    Ok(root)
}

/// Run the parsed command line; returns the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Some(Commands::Init { path, force }) => {
            init::run(&project_dir(path)?, *force)?;
            Ok(0)
        }
        Some(Commands::Doctor {
            path,
            aws,
            endpoint,
        }) => {
            let root = project_dir(path)?;
            let overrides = CliOverrides {
                aws: *aws,
                endpoint: endpoint.clone(),
                region: cli.region.clone(),
                ..Default::default()
            };
            let config = RunConfig::resolve(&root, &load_project_config(&root), &overrides);
            doctor::run(&config)
        }
        None => {
            let root = project_dir(&cli.path)?;
            let config = RunConfig::resolve(&root, &load_project_config(&root), &cli.overrides());
            match config.mode {
                Mode::Audit => run_audit(&config),
                Mode::Verify => run_verify(&config),
            }
        }
    }
}
