//! Static audit
//!
//! Pattern-based structural auditing of a Terraform project. The sources are
//! never parsed into a syntax tree: rules are regexes over comment-stripped
//! text, which is deliberately approximate.
//!
//! Flow: path selection → catalogue sections → strip + score per file →
//! aggregate into a [`ScoreCard`].

pub mod catalogue;
pub mod path;
pub mod pattern;
pub mod scorer;
pub mod strip;

pub use catalogue::{Catalogue, SectionSpec};
pub use path::{select_path, ComputeSection, DEFAULT_TOGGLE_VARIABLE};
pub use scorer::evaluate_section;
pub use strip::strip_comments;

use crate::models::ScoreCard;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only view of the audited project directory.
///
/// Files are read from disk on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct ProjectFiles {
    root: PathBuf,
}

impl ProjectFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File content, or `None` when it does not exist or cannot be read
    pub fn read(&self, name: &str) -> Option<String> {
        let path = self.root.join(name);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found", path.display());
                None
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Run the static audit over `files` with the given catalogue.
pub fn audit_project(
    catalogue: &Catalogue,
    files: &ProjectFiles,
    toggle_variable: &str,
) -> ScoreCard {
    let alternate = files.read(catalogue::CONTAINER_FILE);
    let variables = files.read(catalogue::VARIABLES_FILE);
    let compute = select_path(
        catalogue,
        alternate.as_deref(),
        variables.as_deref(),
        toggle_variable,
    );
    debug!("Deployment path: {}", compute.path());

    let sections = catalogue
        .active_sections(compute.spec())
        .into_iter()
        .map(|spec| {
            let content = files.read(spec.file);
            let score = evaluate_section(spec, content.as_deref());
            debug!(
                section = spec.title,
                earned = score.points_earned,
                max = score.points_max,
                "Scored section"
            );
            score
        })
        .collect();

    ScoreCard::new(compute.path(), sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeploymentPath;

    #[test]
    fn test_empty_directory_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let card = audit_project(Catalogue::standard(), &ProjectFiles::new(dir.path()), "use_ecs");
        assert_eq!(card.total_earned, 0);
        assert_eq!(card.total_max, 100);
        assert_eq!(card.path, DeploymentPath::Traditional);
        assert_eq!(card.sections.len(), 7);
        assert!(card.sections.iter().all(|s| s.checks.len() == 1 && !s.checks[0].passed));
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let files = ProjectFiles::new(dir.path());
        assert!(files.read("main.tf").is_none());
        std::fs::write(dir.path().join("main.tf"), "").unwrap();
        assert_eq!(files.read("main.tf").as_deref(), Some(""));
    }
}
