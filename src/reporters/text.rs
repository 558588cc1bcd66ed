//! Text (terminal) reporter with colors and formatting
//!
//! Colors come from `console`, which turns them off when stdout is not a
//! terminal.

use crate::models::{
    AuditReport, KindReport, ProbeStatus, SectionScore, SectionStatus, SyntaxStatus,
    VerificationReport, Verdict,
};
use console::style;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{}", style(&rule).cyan());
    let _ = writeln!(out, "  {}", style(title).cyan().bold());
    let _ = writeln!(out, "{}\n", style(&rule).cyan());
}

fn closing_rule(out: &mut String) {
    let _ = writeln!(out, "{}", style("=".repeat(RULE_WIDTH)).cyan());
}

fn ok_tag() -> String {
    style("[OK]").green().to_string()
}

fn fail_tag() -> String {
    style("[X]").red().to_string()
}

fn section_tag(section: &SectionScore) -> String {
    match section.status() {
        SectionStatus::Pass => style("[PASS]").green().to_string(),
        SectionStatus::Partial => style("[PARTIAL]").yellow().to_string(),
        SectionStatus::Fail => style("[FAIL]").red().to_string(),
    }
}

/// Render a static audit as formatted terminal output
pub fn render_audit(report: &AuditReport, verbose: bool) -> String {
    let card = &report.score_card;
    let mut out = String::new();

    banner(&mut out, "Terraform 3-Tier Architecture Audit");
    let _ = writeln!(out, "  {} {}\n", style("Path:").cyan(), card.path);

    for section in &card.sections {
        let _ = writeln!(
            out,
            "  {} {} ({}/{} points)",
            section_tag(section),
            section.title,
            section.points_earned,
            section.points_max
        );
        if verbose {
            for check in &section.checks {
                let tag = if check.passed { ok_tag() } else { fail_tag() };
                let _ = writeln!(out, "      {} {}", tag, check.label);
            }
        }
    }

    let _ = writeln!(out, "\n  {}", style("Syntax Validation:").cyan());
    match &report.syntax {
        SyntaxStatus::Valid(message) => {
            let _ = writeln!(out, "      {} {}", ok_tag(), message);
        }
        SyntaxStatus::Invalid(diagnostics) => {
            let _ = writeln!(out, "      {} {}", fail_tag(), diagnostics.join("; "));
        }
        SyntaxStatus::Unknown(message) => {
            let _ = writeln!(out, "      {} {}", style("[?]").yellow(), message);
        }
        SyntaxStatus::Skipped => {
            let _ = writeln!(out, "      {} skipped", style("[-]").dim());
        }
    }

    let _ = writeln!(out, "\n{}", style("=".repeat(RULE_WIDTH)).cyan());
    let _ = writeln!(
        out,
        "  {}",
        style(format!("Total Score: {}/{}", card.total_earned, card.total_max)).bold()
    );
    let verdict = if card.is_complete() {
        style("CHALLENGE COMPLETE!".to_string()).green().bold()
    } else if card.total_earned >= 80 {
        style("Almost there! Check the failing sections above.".to_string()).yellow()
    } else if card.total_earned >= 50 {
        style("Good progress! Keep going.".to_string()).yellow()
    } else {
        style("Just getting started. Work through the sections above.".to_string()).red()
    };
    let _ = writeln!(out, "  {}", verdict);
    closing_rule(&mut out);

    out
}

fn kind_line(report: &KindReport, verbose: bool, out: &mut String) {
    let name = report.expectation.kind.display_name();
    let observed = report
        .observation
        .as_ref()
        .map(|o| o.observed_count)
        .unwrap_or(0);

    match report.verdict {
        Verdict::Ok => {
            let _ = writeln!(out, "  {} {} ({} found)", ok_tag(), name, observed);
        }
        Verdict::Partial => {
            let expected = match report.expectation.exact_count {
                Some(exact) => format!("expected exactly {}", exact),
                None => format!("expected at least {}", report.expectation.minimum_count),
            };
            let _ = writeln!(
                out,
                "  {} {} ({} found, {})",
                style("[!]").yellow(),
                name,
                observed,
                expected
            );
        }
        Verdict::Missing => match &report.error {
            Some(error) => {
                let _ = writeln!(out, "  {} {}: query failed ({})", fail_tag(), name, error);
            }
            None => {
                let _ = writeln!(out, "  {} No {} found", fail_tag(), name.to_lowercase());
            }
        },
        Verdict::Unavailable => {
            let _ = writeln!(
                out,
                "  {} {}: not available in this environment",
                style("[SKIP]").yellow(),
                name
            );
            if verbose {
                if let Some(error) = &report.error {
                    let _ = writeln!(out, "      {}", style(error).dim());
                }
            }
        }
    }

    if verbose {
        if let Some(observation) = &report.observation {
            for sample in &observation.samples {
                let details: Vec<String> = sample
                    .fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                if details.is_empty() {
                    let _ = writeln!(out, "      - {}", sample.id);
                } else {
                    let _ = writeln!(out, "      - {} ({})", sample.id, details.join(", "));
                }
            }
        }
    }
}

/// Render a live verification as formatted terminal output
pub fn render_verification(report: &VerificationReport, verbose: bool) -> String {
    let mut out = String::new();

    banner(&mut out, "Live Infrastructure Verification");
    let _ = writeln!(out, "  {} {}\n", style("Target:").cyan(), report.target);

    match &report.probe {
        ProbeStatus::Reachable(message) => {
            let _ = writeln!(out, "  {} {}", ok_tag(), message);
        }
        ProbeStatus::Unreachable(message) => {
            let _ = writeln!(out, "  {} {}", fail_tag(), message);
        }
    }

    for kind in &report.kinds {
        kind_line(kind, verbose, &mut out);
    }

    let unavailable = report.count(Verdict::Unavailable);
    let _ = writeln!(out, "\n{}", style("=".repeat(RULE_WIDTH)).cyan());
    if report.passed() {
        let _ = writeln!(out, "  {}", style("All available resources verified!").green().bold());
        if unavailable > 0 {
            let _ = writeln!(
                out,
                "  ({} kind(s) unavailable here; covered by the static audit)",
                unavailable
            );
        }
    } else {
        let _ = writeln!(
            out,
            "  {}",
            style("Some resources are missing or incomplete. Run 'terraform apply' first.").yellow()
        );
    }
    closing_rule(&mut out);

    out
}
