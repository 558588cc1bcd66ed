//! Reconciliation of observed resources against expectations

use super::profile::EnvironmentProfile;
use super::query::{QueryError, ResourceLister};
use crate::models::{
    KindReport, ProbeStatus, ResourceExpectation, ResourceObservation, VerificationReport, Verdict,
};
use tracing::{info, warn};

/// Verdict for a successful listing
pub fn verdict_for_count(expectation: &ResourceExpectation, observed: usize) -> Verdict {
    if observed == 0 {
        return Verdict::Missing;
    }
    if observed < expectation.minimum_count {
        return Verdict::Partial;
    }
    match expectation.exact_count {
        Some(exact) if observed > exact => Verdict::Partial,
        _ => Verdict::Ok,
    }
}

/// Classify one kind. A failed query is UNAVAILABLE for kinds the
/// environment is known not to serve and MISSING for everything else.
pub fn classify(
    expectation: &ResourceExpectation,
    outcome: Result<ResourceObservation, QueryError>,
    unsupported: bool,
) -> KindReport {
    match outcome {
        Ok(observation) => KindReport {
            expectation: *expectation,
            verdict: verdict_for_count(expectation, observation.observed_count),
            observation: Some(observation),
            error: None,
        },
        Err(e) => KindReport {
            expectation: *expectation,
            verdict: if unsupported {
                Verdict::Unavailable
            } else {
                Verdict::Missing
            },
            observation: None,
            error: Some(e.to_string()),
        },
    }
}

/// Query every expected kind once, in order, and reconcile.
pub fn verify(
    lister: &dyn ResourceLister,
    profile: &EnvironmentProfile,
    expectations: &[ResourceExpectation],
    probe: ProbeStatus,
) -> VerificationReport {
    let kinds = expectations
        .iter()
        .map(|expectation| {
            let outcome = lister.list(expectation.kind);
            if let Err(e) = &outcome {
                warn!("Query for {} failed: {}", expectation.kind, e);
            }
            let report = classify(expectation, outcome, profile.is_unsupported(expectation.kind));
            info!(kind = %expectation.kind, verdict = %report.verdict, "Verified resource kind");
            report
        })
        .collect();

    VerificationReport {
        target: profile.target.to_string(),
        probe,
        kinds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceKind, ResourceRecord};
    use std::collections::HashMap;

    /// Canned listings keyed by kind; absent kinds fail with a transport error
    struct FakeLister {
        counts: HashMap<ResourceKind, usize>,
    }

    impl ResourceLister for FakeLister {
        fn list(&self, kind: ResourceKind) -> Result<ResourceObservation, QueryError> {
            match self.counts.get(&kind) {
                Some(n) => Ok(ResourceObservation::from_records(
                    kind,
                    (0..*n)
                        .map(|i| ResourceRecord {
                            id: format!("{kind}-{i}"),
                            fields: vec![],
                        })
                        .collect(),
                )),
                None => Err(QueryError::Transport("connection refused".into())),
            }
        }
    }

    #[test]
    fn test_three_of_four_is_partial() {
        let exp = ResourceExpectation::at_least(ResourceKind::SecurityGroups, 4);
        assert_eq!(verdict_for_count(&exp, 3), Verdict::Partial);
        assert_eq!(verdict_for_count(&exp, 0), Verdict::Missing);
        assert_eq!(verdict_for_count(&exp, 4), Verdict::Ok);
        assert_eq!(verdict_for_count(&exp, 9), Verdict::Ok);
    }

    #[test]
    fn test_exact_count_downgrades_overcount() {
        let exp = ResourceExpectation::exactly(ResourceKind::Subnets, 6);
        assert_eq!(verdict_for_count(&exp, 6), Verdict::Ok);
        assert_eq!(verdict_for_count(&exp, 7), Verdict::Partial);
        assert_eq!(verdict_for_count(&exp, 5), Verdict::Partial);
    }

    #[test]
    fn test_failure_classification() {
        let exp = ResourceExpectation::at_least(ResourceKind::DbInstances, 1);
        let err = || Err(QueryError::Status {
            code: 254,
            detail: "501".into(),
        });
        assert_eq!(classify(&exp, err(), true).verdict, Verdict::Unavailable);
        let missing = classify(&exp, err(), false);
        assert_eq!(missing.verdict, Verdict::Missing);
        assert!(missing.error.unwrap().contains("254"));
    }

    #[test]
    fn test_zero_observed_is_missing_even_if_unsupported() {
        let exp = ResourceExpectation::at_least(ResourceKind::LoadBalancers, 1);
        let outcome = Ok(ResourceObservation::from_records(ResourceKind::LoadBalancers, vec![]));
        assert_eq!(classify(&exp, outcome, true).verdict, Verdict::Missing);
    }

    #[test]
    fn test_localstack_run_excludes_unavailable() {
        let lister = FakeLister {
            counts: HashMap::from([
                (ResourceKind::Vpcs, 1),
                (ResourceKind::Subnets, 6),
                (ResourceKind::SecurityGroups, 4),
                (ResourceKind::Instances, 4),
            ]),
        };
        let profile = EnvironmentProfile::default();
        let report = verify(
            &lister,
            &profile,
            &crate::live::default_expectations(),
            ProbeStatus::Reachable("ok".into()),
        );
        assert_eq!(report.count(Verdict::Ok), 4);
        assert_eq!(report.count(Verdict::Unavailable), 3);
        assert!(report.passed());
    }

    #[test]
    fn test_same_failures_on_aws_are_missing() {
        let lister = FakeLister {
            counts: HashMap::from([(ResourceKind::Vpcs, 1)]),
        };
        let report = verify(
            &lister,
            &EnvironmentProfile::aws(),
            &crate::live::default_expectations(),
            ProbeStatus::Reachable("ok".into()),
        );
        assert_eq!(report.count(Verdict::Missing), 6);
        assert!(!report.passed());
    }

    #[test]
    fn test_every_kind_unavailable_passes() {
        let lister = FakeLister {
            counts: HashMap::new(),
        };
        let mut profile = EnvironmentProfile::default();
        profile.unsupported = ResourceKind::all().iter().copied().collect();
        let report = verify(
            &lister,
            &profile,
            &crate::live::default_expectations(),
            ProbeStatus::Unreachable("down".into()),
        );
        assert_eq!(report.count(Verdict::Unavailable), report.kinds.len());
        assert!(report.passed());
    }

    #[test]
    fn test_report_preserves_expectation_order() {
        let lister = FakeLister {
            counts: HashMap::new(),
        };
        let expectations = crate::live::default_expectations();
        let report = verify(
            &lister,
            &EnvironmentProfile::default(),
            &expectations,
            ProbeStatus::Reachable("ok".into()),
        );
        let kinds: Vec<ResourceKind> = report.kinds.iter().map(|k| k.expectation.kind).collect();
        let expected: Vec<ResourceKind> = expectations.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, expected);
    }
}
