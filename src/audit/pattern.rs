//! Matching predicates used by rules
//!
//! Scoring only talks to the [`Matcher`] trait, so a smarter matcher (an HCL
//! parser, for instance) can replace [`RegexMatcher`] without touching the
//! scorer.

use regex::{Regex, RegexBuilder};
use std::fmt;

/// Text predicate evaluated against stripped file content
pub trait Matcher: Send + Sync + fmt::Debug {
    fn is_match(&self, content: &str) -> bool;

    /// Number of non-overlapping matches
    fn count(&self, content: &str) -> usize;
}

/// Regex-backed matcher
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn case_insensitive(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: RegexBuilder::new(pattern).case_insensitive(true).build()?,
        })
    }
}

impl Matcher for RegexMatcher {
    fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }

    fn count(&self, content: &str) -> usize {
        self.regex.find_iter(content).count()
    }
}
