//! Live verification
//!
//! Cross-checks a running environment (LocalStack or AWS) against the
//! architecture's expected resource counts. Read-only: only listing calls are
//! issued, one per kind, each with its own timeout and no retries.

pub mod probe;
pub mod profile;
pub mod query;
pub mod resources;
pub mod verifier;

pub use profile::{EnvironmentProfile, Target};
pub use query::{AwsCliLister, QueryError, ResourceLister};
pub use resources::default_expectations;
pub use verifier::{classify, verdict_for_count, verify};

use crate::models::{ResourceExpectation, VerificationReport};
use tracing::info;

/// Probe the environment, then list and reconcile every expected kind
pub fn run_verification(
    profile: &EnvironmentProfile,
    expectations: &[ResourceExpectation],
) -> VerificationReport {
    let status = probe::probe(profile);
    info!("Environment probe for {}: {:?}", profile.target, status);
    let lister = AwsCliLister::new(profile);
    verify(&lister, profile, expectations, status)
}
