//! Core data models for tiercheck
//!
//! These models are shared by the static auditor, the live verifier and the
//! reporters. Everything here is created fresh per invocation; nothing is
//! persisted between runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed ceiling of a static audit, identical on both deployment paths.
pub const TOTAL_MAX: u32 = 100;

/// Outcome of a single rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub label: String,
    pub passed: bool,
}

impl CheckResult {
    pub fn pass(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: true,
        }
    }

    pub fn fail(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: false,
        }
    }
}

/// Coarse status of a section, used for the `[PASS]`/`[PARTIAL]`/`[FAIL]` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Pass,
    Partial,
    Fail,
}

/// Score of one category against one file.
///
/// `points_earned` never exceeds `points_max`; the scorer caps before
/// constructing the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub title: String,
    pub points_earned: u32,
    pub points_max: u32,
    /// Checks in rule-declaration order
    pub checks: Vec<CheckResult>,
}

impl SectionScore {
    pub fn status(&self) -> SectionStatus {
        if self.points_earned == self.points_max {
            SectionStatus::Pass
        } else if self.points_earned > 0 {
            SectionStatus::Partial
        } else {
            SectionStatus::Fail
        }
    }
}

/// Which of the two mutually exclusive architectures the project follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentPath {
    /// EC2 instances behind the load balancer
    #[default]
    Traditional,
    /// ECS services on a cluster
    Containerized,
}

impl fmt::Display for DeploymentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentPath::Traditional => write!(f, "EC2 (Traditional)"),
            DeploymentPath::Containerized => write!(f, "ECS (Containerized)"),
        }
    }
}

/// Aggregate of all active sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub path: DeploymentPath,
    pub sections: Vec<SectionScore>,
    pub total_earned: u32,
    pub total_max: u32,
}

impl ScoreCard {
    /// Sum the (already capped) sections. The result does not depend on
    /// section order.
    pub fn new(path: DeploymentPath, sections: Vec<SectionScore>) -> Self {
        let total_earned = sections
            .iter()
            .map(|s| s.points_earned.min(s.points_max))
            .sum::<u32>()
            .min(TOTAL_MAX);
        Self {
            path,
            sections,
            total_earned,
            total_max: TOTAL_MAX,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_earned == self.total_max
    }

    pub fn section(&self, title: &str) -> Option<&SectionScore> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Tri-state outcome of the external syntax validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum SyntaxStatus {
    Valid(String),
    /// One entry per diagnostic
    Invalid(Vec<String>),
    /// Validator missing or did not finish; never penalised
    Unknown(String),
    Skipped,
}

/// Everything a static run produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub score_card: ScoreCard,
    pub syntax: SyntaxStatus,
}

/// Resource categories the live verifier knows how to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpcs,
    Subnets,
    SecurityGroups,
    LoadBalancers,
    TargetGroups,
    Instances,
    DbInstances,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Vpcs,
            ResourceKind::Subnets,
            ResourceKind::SecurityGroups,
            ResourceKind::LoadBalancers,
            ResourceKind::TargetGroups,
            ResourceKind::Instances,
            ResourceKind::DbInstances,
        ]
    }

    /// Config / JSON key
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Vpcs => "vpcs",
            ResourceKind::Subnets => "subnets",
            ResourceKind::SecurityGroups => "security_groups",
            ResourceKind::LoadBalancers => "load_balancers",
            ResourceKind::TargetGroups => "target_groups",
            ResourceKind::Instances => "instances",
            ResourceKind::DbInstances => "db_instances",
        }
    }

    /// Human label used by the reporters
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Vpcs => "VPC",
            ResourceKind::Subnets => "Subnets",
            ResourceKind::SecurityGroups => "Security groups",
            ResourceKind::LoadBalancers => "Load balancers",
            ResourceKind::TargetGroups => "Target groups",
            ResourceKind::Instances => "EC2 instances (running)",
            ResourceKind::DbInstances => "RDS instances",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ResourceKind::all()
            .iter()
            .copied()
            .find(|k| k.key() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = ResourceKind::all().iter().map(|k| k.key()).collect();
                format!(
                    "Unknown resource kind '{}'. Valid kinds: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// How many resources of a kind the architecture calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExpectation {
    pub kind: ResourceKind,
    pub minimum_count: usize,
    /// When set, an over-count is downgraded to PARTIAL
    pub exact_count: Option<usize>,
}

impl ResourceExpectation {
    pub fn at_least(kind: ResourceKind, minimum_count: usize) -> Self {
        Self {
            kind,
            minimum_count,
            exact_count: None,
        }
    }

    pub fn exactly(kind: ResourceKind, count: usize) -> Self {
        Self {
            kind,
            minimum_count: count,
            exact_count: Some(count),
        }
    }
}

/// One listed resource: an identifier plus a few descriptive fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    /// `(field, value)` pairs in display order
    pub fields: Vec<(String, String)>,
}

impl ResourceRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What a successful query returned for one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceObservation {
    pub kind: ResourceKind,
    pub observed_count: usize,
    pub samples: Vec<ResourceRecord>,
}

impl ResourceObservation {
    pub fn from_records(kind: ResourceKind, samples: Vec<ResourceRecord>) -> Self {
        Self {
            kind,
            observed_count: samples.len(),
            samples,
        }
    }
}

/// Per-kind verdict of the live verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Ok,
    Partial,
    Missing,
    /// Capability gap of the current environment; excluded from pass/fail
    Unavailable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Partial => write!(f, "PARTIAL"),
            Verdict::Missing => write!(f, "MISSING"),
            Verdict::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

/// Verdict for one kind plus the evidence behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
    pub expectation: ResourceExpectation,
    pub verdict: Verdict,
    /// `None` when the query failed
    pub observation: Option<ResourceObservation>,
    /// Query failure message, if any
    pub error: Option<String>,
}

/// Environment reachability as reported by the pre-flight probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum ProbeStatus {
    Reachable(String),
    Unreachable(String),
}

impl ProbeStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeStatus::Reachable(_))
    }
}

/// Result of a full live verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub target: String,
    pub probe: ProbeStatus,
    pub kinds: Vec<KindReport>,
}

impl VerificationReport {
    /// True when every kind that is not UNAVAILABLE is OK
    pub fn passed(&self) -> bool {
        self.kinds
            .iter()
            .filter(|k| k.verdict != Verdict::Unavailable)
            .all(|k| k.verdict == Verdict::Ok)
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.kinds.iter().filter(|k| k.verdict == verdict).count()
    }

    pub fn kind(&self, kind: ResourceKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.expectation.kind == kind)
    }
}
