//! Deployment path selection
//!
//! The containerized path replaces the compute section only when both signals
//! agree: the alternate file declares the marker resource, and the toggle
//! variable defaults to `true`. Either signal alone keeps the traditional
//! path.

use super::catalogue::{Catalogue, SectionSpec};
use super::pattern::{Matcher, RegexMatcher};
use super::strip::strip_comments;
use crate::models::DeploymentPath;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Variable whose default switches the project to the containerized path
pub const DEFAULT_TOGGLE_VARIABLE: &str = "use_ecs";

/// Compute section chosen for this run
#[derive(Debug, Clone, Copy)]
pub enum ComputeSection<'a> {
    Traditional(&'a SectionSpec),
    Containerized(&'a SectionSpec),
}

impl<'a> ComputeSection<'a> {
    pub fn path(&self) -> DeploymentPath {
        match self {
            ComputeSection::Traditional(_) => DeploymentPath::Traditional,
            ComputeSection::Containerized(_) => DeploymentPath::Containerized,
        }
    }

    pub fn spec(&self) -> &'a SectionSpec {
        match self {
            ComputeSection::Traditional(spec) | ComputeSection::Containerized(spec) => spec,
        }
    }
}

/// Decide the compute section from the alternate file and the variables file
pub fn select_path<'a>(
    catalogue: &'a Catalogue,
    alternate: Option<&str>,
    variables: Option<&str>,
    toggle_variable: &str,
) -> ComputeSection<'a> {
    let marker_present = alternate
        .map(strip_comments)
        .is_some_and(|content| catalogue.alternate_marker.is_match(&content));

    let toggle_enabled = variables
        .map(strip_comments)
        .is_some_and(|content| toggle_defaults_true(&content, toggle_variable));

    debug!(
        marker_present,
        toggle_enabled, toggle_variable, "Resolved deployment path signals"
    );

    if marker_present && toggle_enabled {
        ComputeSection::Containerized(&catalogue.compute_containerized)
    } else {
        ComputeSection::Traditional(&catalogue.compute_traditional)
    }
}

/// Whether `variable "<name>" { ... default = true ... }` appears in stripped
/// variables content. Only a `default` attribute at the start of a line
/// counts, so the phrase inside a description string does not.
pub fn toggle_defaults_true(stripped: &str, name: &str) -> bool {
    let Some(found) = variable_header()
        .captures_iter(stripped)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(0))
    else {
        return false;
    };

    let body = block_body(&stripped[found.end()..]);
    default_true().is_match(body)
}

fn variable_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r#"variable\s+"([^"]+)"\s*\{"#).expect("valid regex"))
}

fn default_true() -> &'static RegexMatcher {
    static DEFAULT_TRUE: OnceLock<RegexMatcher> = OnceLock::new();
    DEFAULT_TRUE.get_or_init(|| {
        RegexMatcher::case_insensitive(r"(?m)^\s*default\s*=\s*true\b").expect("valid regex")
    })
}

/// Text up to the brace closing a block whose `{` was just consumed.
/// Braces inside quoted strings are ignored. Unbalanced input yields the rest
/// of the text.
fn block_body(after_open: &str) -> &str {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in after_open.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' | '\n' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' if depth == 0 => return &after_open[..i],
            '}' => depth -= 1,
            _ => {}
        }
    }
    after_open
}
