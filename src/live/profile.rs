//! Target environment description

use crate::models::ResourceKind;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where live queries go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Local emulator reached through an endpoint override
    LocalStack { endpoint: String },
    /// Real AWS, credentials from the environment
    Aws,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::LocalStack { endpoint } => write!(f, "LocalStack ({})", endpoint),
            Target::Aws => write!(f, "AWS"),
        }
    }
}

/// Resource kinds LocalStack Community does not serve
pub fn community_unsupported() -> BTreeSet<ResourceKind> {
    [
        ResourceKind::LoadBalancers,
        ResourceKind::TargetGroups,
        ResourceKind::DbInstances,
    ]
    .into_iter()
    .collect()
}

/// Target plus the capability gaps and timeouts that go with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub target: Target,
    pub region: String,
    /// Kinds whose query failures are a capability gap, not a user error
    pub unsupported: BTreeSet<ResourceKind>,
    pub query_timeout: Duration,
    pub probe_timeout: Duration,
}

impl EnvironmentProfile {
    pub fn localstack(endpoint: impl Into<String>) -> Self {
        Self {
            target: Target::LocalStack {
                endpoint: endpoint.into(),
            },
            region: DEFAULT_REGION.to_string(),
            unsupported: community_unsupported(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn aws() -> Self {
        Self {
            target: Target::Aws,
            region: DEFAULT_REGION.to_string(),
            unsupported: BTreeSet::new(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn is_unsupported(&self, kind: ResourceKind) -> bool {
        self.unsupported.contains(&kind)
    }

    pub fn is_local(&self) -> bool {
        matches!(self.target, Target::LocalStack { .. })
    }
}

impl Default for EnvironmentProfile {
    fn default() -> Self {
        Self::localstack(DEFAULT_ENDPOINT)
    }
}
