//! Static audit command

use crate::audit::{audit_project, Catalogue, ProjectFiles};
use crate::config::RunConfig;
use crate::models::{AuditReport, SyntaxStatus};
use crate::reporters::render_audit;
use crate::validate::run_terraform_validate;
use anyhow::Result;
use tracing::info;

/// Score the project and run the syntax validator
pub fn audit(config: &RunConfig) -> AuditReport {
    let files = ProjectFiles::new(&config.root);
    let score_card = audit_project(Catalogue::standard(), &files, &config.toggle_variable);
    info!(
        "Audit of {}: {}/{} ({})",
        config.root.display(),
        score_card.total_earned,
        score_card.total_max,
        score_card.path
    );

    let syntax = if config.validate {
        run_terraform_validate(&config.root, config.validate_timeout)
    } else {
        SyntaxStatus::Skipped
    };

    AuditReport { score_card, syntax }
}

/// Print the audit; exit code 0 only for a perfect score
pub fn run_audit(config: &RunConfig) -> Result<i32> {
    let report = audit(config);
    println!("{}", render_audit(&report, config.format, config.verbose)?);
    Ok(if report.score_card.is_complete() { 0 } else { 1 })
}
