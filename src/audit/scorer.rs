//! Section scoring

use super::catalogue::SectionSpec;
use super::strip::strip_comments;
use crate::models::{CheckResult, SectionScore};
use tracing::{debug, trace};

/// Score one section against one file.
///
/// `content` is `None` when the file does not exist; that yields zero points
/// and a single failing check. Otherwise rules see stripped content only, so
/// commented-out code earns nothing.
pub fn evaluate_section(spec: &SectionSpec, content: Option<&str>) -> SectionScore {
    let Some(raw) = content else {
        debug!(category = %spec.category, file = spec.file, "Section file not found");
        return SectionScore {
            title: spec.title.to_string(),
            points_earned: 0,
            points_max: spec.max_points,
            checks: vec![CheckResult::fail(spec.missing_label)],
        };
    };

    let stripped = strip_comments(raw);
    let mut earned = 0u32;
    let mut checks = Vec::with_capacity(spec.rules.len());
    for rule in &spec.rules {
        let outcome = rule.evaluate(&stripped);
        trace!(
            category = %rule.category,
            rule = rule.label,
            points = outcome.points,
            "Evaluated rule"
        );
        earned = earned.saturating_add(outcome.points);
        checks.push(outcome.check);
    }

    debug!(
        category = %spec.category,
        earned,
        max = spec.max_points,
        "Scored section"
    );
    SectionScore {
        title: spec.title.to_string(),
        points_earned: earned.min(spec.max_points),
        points_max: spec.max_points,
        checks,
    }
}
