//! Output reporters for tiercheck results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//!
//! Reporters only read the reports they are given.

mod json;
mod text;

use crate::models::{AuditReport, VerificationReport};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a static audit
pub fn render_audit(report: &AuditReport, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_audit(report, verbose)),
        OutputFormat::Json => json::render(report),
    }
}

/// Render a live verification
pub fn render_verification(
    report: &VerificationReport,
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_verification(report, verbose)),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        CheckResult, DeploymentPath, KindReport, ProbeStatus, ResourceExpectation, ResourceKind,
        ResourceObservation, ResourceRecord, ScoreCard, SectionScore, SyntaxStatus, Verdict,
    };

    /// A partially complete traditional-path audit
    pub(crate) fn test_audit() -> AuditReport {
        let sections = vec![
            SectionScore {
                title: "Provider Config".into(),
                points_earned: 5,
                points_max: 5,
                checks: vec![
                    CheckResult::pass("terraform block"),
                    CheckResult::pass("aws provider"),
                ],
            },
            SectionScore {
                title: "RDS Database".into(),
                points_earned: 7,
                points_max: 15,
                checks: vec![
                    CheckResult::pass("db subnet group"),
                    CheckResult::fail("multi-az enabled"),
                ],
            },
            SectionScore {
                title: "Variables".into(),
                points_earned: 0,
                points_max: 5,
                checks: vec![CheckResult::fail("variables config not found")],
            },
        ];
        AuditReport {
            score_card: ScoreCard::new(DeploymentPath::Traditional, sections),
            syntax: SyntaxStatus::Unknown("Terraform not installed".into()),
        }
    }

    /// LocalStack run: VPC ok, subnets short, RDS unavailable
    pub(crate) fn test_verification() -> VerificationReport {
        let vpc = ResourceObservation::from_records(
            ResourceKind::Vpcs,
            vec![ResourceRecord {
                id: "vpc-0abc".into(),
                fields: vec![("Cidr".into(), "10.0.0.0/16".into())],
            }],
        );
        let subnets = ResourceObservation::from_records(
            ResourceKind::Subnets,
            (0..3)
                .map(|i| ResourceRecord {
                    id: format!("subnet-{i}"),
                    fields: vec![],
                })
                .collect(),
        );
        VerificationReport {
            target: "LocalStack (http://localhost:4566)".into(),
            probe: ProbeStatus::Reachable("LocalStack is running".into()),
            kinds: vec![
                KindReport {
                    expectation: ResourceExpectation::at_least(ResourceKind::Vpcs, 1),
                    verdict: Verdict::Ok,
                    observation: Some(vpc),
                    error: None,
                },
                KindReport {
                    expectation: ResourceExpectation::at_least(ResourceKind::Subnets, 6),
                    verdict: Verdict::Partial,
                    observation: Some(subnets),
                    error: None,
                },
                KindReport {
                    expectation: ResourceExpectation::at_least(ResourceKind::DbInstances, 1),
                    verdict: Verdict::Unavailable,
                    observation: None,
                    error: Some("exit code 254: An error occurred (501)".into()),
                },
            ],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::default().to_string(), "text");
    }

    #[test]
    fn test_rendering_leaves_report_untouched() {
        let audit = test_audit();
        let before = audit.clone();
        render_audit(&audit, OutputFormat::Text, true).unwrap();
        render_audit(&audit, OutputFormat::Json, true).unwrap();
        assert_eq!(audit, before);
    }
}
