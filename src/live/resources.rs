//! Expected resources and how to list them
//!
//! Each kind maps to one read-only AWS CLI listing call and a projection of
//! its JSON response onto [`ResourceRecord`]s.

use crate::models::{ResourceExpectation, ResourceKind, ResourceRecord};
use serde_json::Value;

/// AWS CLI invocation for one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    pub service: &'static str,
    pub action: &'static str,
    pub extra_args: &'static [&'static str],
}

pub fn query_spec(kind: ResourceKind) -> QuerySpec {
    let (service, action, extra_args): (_, _, &'static [&'static str]) = match kind {
        ResourceKind::Vpcs => ("ec2", "describe-vpcs", &[]),
        ResourceKind::Subnets => ("ec2", "describe-subnets", &[]),
        ResourceKind::SecurityGroups => ("ec2", "describe-security-groups", &[]),
        ResourceKind::LoadBalancers => ("elbv2", "describe-load-balancers", &[]),
        ResourceKind::TargetGroups => ("elbv2", "describe-target-groups", &[]),
        ResourceKind::Instances => (
            "ec2",
            "describe-instances",
            &["--filters", "Name=instance-state-name,Values=running"],
        ),
        ResourceKind::DbInstances => ("rds", "describe-db-instances", &[]),
    };
    QuerySpec {
        service,
        action,
        extra_args,
    }
}

/// Expectations of the three-tier architecture: one VPC, six subnets
/// (public, app, db across two AZs), four non-default security groups, one
/// load balancer with a target group, at least two running instances and one
/// database.
pub fn default_expectations() -> Vec<ResourceExpectation> {
    vec![
        ResourceExpectation::at_least(ResourceKind::Vpcs, 1),
        ResourceExpectation::at_least(ResourceKind::Subnets, 6),
        ResourceExpectation::at_least(ResourceKind::SecurityGroups, 4),
        ResourceExpectation::at_least(ResourceKind::LoadBalancers, 1),
        ResourceExpectation::at_least(ResourceKind::TargetGroups, 1),
        ResourceExpectation::at_least(ResourceKind::Instances, 2),
        ResourceExpectation::at_least(ResourceKind::DbInstances, 1),
    ]
}

/// Read a nested field as display text
fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    match cur {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn array_at<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, String> {
    value
        .get(key)
        .ok_or_else(|| format!("missing '{}' in response", key))?
        .as_array()
        .ok_or_else(|| format!("'{}' is not a list", key))
}

fn record(item: &Value, id_path: &[&str], fields: &[(&str, &[&str])]) -> ResourceRecord {
    ResourceRecord {
        id: text_at(item, id_path).unwrap_or_else(|| "N/A".to_string()),
        fields: fields
            .iter()
            .map(|(name, path)| {
                (
                    name.to_string(),
                    text_at(item, path).unwrap_or_else(|| "N/A".to_string()),
                )
            })
            .collect(),
    }
}

/// Project a listing response onto records. An unexpected shape is an error.
pub fn extract_records(kind: ResourceKind, response: &Value) -> Result<Vec<ResourceRecord>, String> {
    let records = match kind {
        ResourceKind::Vpcs => array_at(response, "Vpcs")?
            .iter()
            .map(|v| record(v, &["VpcId"], &[("Cidr", &["CidrBlock"])]))
            .collect(),
        ResourceKind::Subnets => array_at(response, "Subnets")?
            .iter()
            .map(|v| {
                record(
                    v,
                    &["SubnetId"],
                    &[("Cidr", &["CidrBlock"]), ("AZ", &["AvailabilityZone"])],
                )
            })
            .collect(),
        ResourceKind::SecurityGroups => array_at(response, "SecurityGroups")?
            .iter()
            .filter(|v| v.get("GroupName").and_then(Value::as_str) != Some("default"))
            .map(|v| record(v, &["GroupId"], &[("Name", &["GroupName"])]))
            .collect(),
        ResourceKind::LoadBalancers => array_at(response, "LoadBalancers")?
            .iter()
            .map(|v| {
                record(
                    v,
                    &["LoadBalancerName"],
                    &[("DNS", &["DNSName"]), ("State", &["State", "Code"])],
                )
            })
            .collect(),
        ResourceKind::TargetGroups => array_at(response, "TargetGroups")?
            .iter()
            .map(|v| {
                record(
                    v,
                    &["TargetGroupName"],
                    &[("Port", &["Port"]), ("Protocol", &["Protocol"])],
                )
            })
            .collect(),
        ResourceKind::Instances => {
            let mut instances = Vec::new();
            for reservation in array_at(response, "Reservations")? {
                for inst in array_at(reservation, "Instances")? {
                    let state = text_at(inst, &["State", "Name"]);
                    if state.as_deref().is_some_and(|s| s != "running") {
                        continue;
                    }
                    instances.push(record(
                        inst,
                        &["InstanceId"],
                        &[("Type", &["InstanceType"]), ("IP", &["PrivateIpAddress"])],
                    ));
                }
            }
            instances
        }
        ResourceKind::DbInstances => array_at(response, "DBInstances")?
            .iter()
            .map(|v| {
                record(
                    v,
                    &["DBInstanceIdentifier"],
                    &[("Engine", &["Engine"]), ("Status", &["DBInstanceStatus"])],
                )
            })
            .collect(),
    };
    Ok(records)
}
