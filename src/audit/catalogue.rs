//! Rule catalogue
//!
//! The catalogue is data: every section is a title, a source file, a ceiling
//! and an ordered list of weighted rules. Rule order is the order checks are
//! shown to the user.
//!
//! Weights inside a section may add up to more than its ceiling; the scorer
//! caps, it never rescales.

use super::pattern::{Matcher, RegexMatcher};
use crate::models::CheckResult;
use std::fmt;
use std::sync::OnceLock;

pub const MAIN_FILE: &str = "main.tf";
pub const NETWORKING_FILE: &str = "vpc.tf";
pub const SECURITY_FILE: &str = "security.tf";
pub const LOAD_BALANCER_FILE: &str = "alb.tf";
pub const COMPUTE_FILE: &str = "ec2.tf";
pub const CONTAINER_FILE: &str = "ecs.tf";
pub const DATABASE_FILE: &str = "rds.tf";
pub const VARIABLES_FILE: &str = "variables.tf";

/// Architectural concern a section covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Provider,
    Networking,
    Security,
    LoadBalancer,
    Compute,
    Database,
    Variables,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Provider => "provider",
            Category::Networking => "networking",
            Category::Security => "security",
            Category::LoadBalancer => "load-balancer",
            Category::Compute => "compute",
            Category::Database => "database",
            Category::Variables => "variables",
        };
        f.write_str(s)
    }
}

/// A count threshold and the points it is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub min_count: usize,
    pub points: u32,
}

/// How a rule decides pass/fail and points
#[derive(Debug)]
pub enum Check {
    /// Full weight when the pattern matches anywhere
    Present(Box<dyn Matcher>),
    /// Points from the highest tier whose threshold the match count reaches
    Tiered {
        matcher: Box<dyn Matcher>,
        /// Highest threshold first
        tiers: Vec<Tier>,
        shortfall: &'static str,
    },
    /// `numerator` matches must reach `min_percent` of `denominator` matches.
    /// Falling short still earns `consolation` points.
    Coverage {
        numerator: Box<dyn Matcher>,
        denominator: Box<dyn Matcher>,
        min_percent: usize,
        consolation: u32,
        shortfall: &'static str,
    },
}

#[derive(Debug)]
pub struct Rule {
    pub category: Category,
    pub label: &'static str,
    pub weight: u32,
    /// Failing optional rules are labelled as such
    pub optional: bool,
    pub check: Check,
}

/// Points and trace entry produced by one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub points: u32,
    pub check: CheckResult,
}

impl Rule {
    /// Evaluate against already-stripped content
    pub fn evaluate(&self, stripped: &str) -> RuleOutcome {
        match &self.check {
            Check::Present(matcher) => {
                if matcher.is_match(stripped) {
                    RuleOutcome {
                        points: self.weight,
                        check: CheckResult::pass(self.label),
                    }
                } else if self.optional {
                    RuleOutcome {
                        points: 0,
                        check: CheckResult::fail(format!("{} (optional)", self.label)),
                    }
                } else {
                    RuleOutcome {
                        points: 0,
                        check: CheckResult::fail(self.label),
                    }
                }
            }
            Check::Tiered {
                matcher,
                tiers,
                shortfall,
            } => {
                let count = matcher.count(stripped);
                match tiers.iter().find(|t| count >= t.min_count) {
                    Some(tier) => RuleOutcome {
                        points: tier.points,
                        check: CheckResult::pass(format!("{} ({})", self.label, count)),
                    },
                    None => RuleOutcome {
                        points: 0,
                        check: CheckResult::fail(format!(
                            "{} ({}, {})",
                            self.label, count, shortfall
                        )),
                    },
                }
            }
            Check::Coverage {
                numerator,
                denominator,
                min_percent,
                consolation,
                shortfall,
            } => {
                let have = numerator.count(stripped);
                let want = denominator.count(stripped);
                if have * 100 >= want * min_percent {
                    RuleOutcome {
                        points: self.weight,
                        check: CheckResult::pass(self.label),
                    }
                } else {
                    RuleOutcome {
                        points: *consolation,
                        check: CheckResult::fail(format!("{} ({})", self.label, shortfall)),
                    }
                }
            }
        }
    }
}

/// One scoring category bound to one file
#[derive(Debug)]
pub struct SectionSpec {
    pub category: Category,
    pub title: &'static str,
    pub file: &'static str,
    /// Label of the synthetic failing check when `file` is absent
    pub missing_label: &'static str,
    pub max_points: u32,
    pub rules: Vec<Rule>,
}

impl SectionSpec {
    /// Sum of every rule's top weight. May exceed `max_points`.
    pub fn nominal_points(&self) -> u32 {
        self.rules.iter().map(|r| r.weight).sum()
    }
}

/// Binary presence rule as written in the tables below
struct PresentDef {
    label: &'static str,
    pattern: &'static str,
    weight: u32,
    optional: bool,
}

const fn present(label: &'static str, pattern: &'static str, weight: u32) -> PresentDef {
    PresentDef {
        label,
        pattern,
        weight,
        optional: false,
    }
}

const fn optional(label: &'static str, pattern: &'static str, weight: u32) -> PresentDef {
    PresentDef {
        label,
        pattern,
        weight,
        optional: true,
    }
}

const PROVIDER_RULES: &[PresentDef] = &[
    present("terraform block", r"terraform\s*\{", 1),
    present("required_providers", r"required_providers\s*\{", 1),
    present("AWS provider", r#"provider\s+"aws""#, 2),
    optional("default_tags", r"default_tags\s*\{", 1),
];

const NETWORKING_RULES: &[PresentDef] = &[
    present("aws_vpc resource", r#"resource\s+"aws_vpc""#, 3),
    present("aws_internet_gateway", r#"resource\s+"aws_internet_gateway""#, 2),
    present("public subnets", r#"resource\s+"aws_subnet"\s+"public""#, 3),
    present("private app subnets", r#"resource\s+"aws_subnet"\s+"private_app""#, 3),
    present("private database subnets", r#"resource\s+"aws_subnet"\s+"private_db""#, 3),
    present("aws_nat_gateway", r#"resource\s+"aws_nat_gateway""#, 3),
    present("route tables", r#"resource\s+"aws_route_table""#, 2),
    present("route table associations", r#"resource\s+"aws_route_table_association""#, 1),
];

const SECURITY_RULES: &[PresentDef] = &[
    present("ALB security group", r#"resource\s+"aws_security_group"\s+"alb""#, 3),
    present("Web tier security group", r#"resource\s+"aws_security_group"\s+"web""#, 2),
    present("App tier security group", r#"resource\s+"aws_security_group"\s+"app""#, 2),
    present("Database security group", r#"resource\s+"aws_security_group"\s+"db""#, 3),
];

const LOAD_BALANCER_RULES: &[PresentDef] = &[
    present("aws_lb resource", r#"resource\s+"aws_lb"\s+"main""#, 6),
    present("target group", r#"resource\s+"aws_lb_target_group""#, 5),
    present("health check configuration", r"health_check\s*\{", 4),
    present("ALB listener", r#"resource\s+"aws_lb_listener""#, 5),
];

const COMPUTE_RULES: &[PresentDef] = &[
    present("AMI data source", r#"data\s+"aws_ami""#, 3),
    present("web tier instances", r#"resource\s+"aws_instance"\s+"web""#, 8),
    present("app tier instances", r#"resource\s+"aws_instance"\s+"app""#, 8),
    present("user_data scripts", r"user_data\s*=", 4),
    present("security group attachment", r"vpc_security_group_ids", 2),
];

const CONTAINER_RULES: &[PresentDef] = &[
    present("ECS cluster", r#"resource\s+"aws_ecs_cluster""#, 5),
    present("ECS task definitions", r#"resource\s+"aws_ecs_task_definition""#, 5),
    present("ECS services", r#"resource\s+"aws_ecs_service""#, 5),
];

const DATABASE_RULES: &[PresentDef] = &[
    present("DB subnet group", r#"resource\s+"aws_db_subnet_group""#, 4),
    present("RDS instance", r#"resource\s+"aws_db_instance""#, 6),
    present("database engine", r#"engine\s*=\s*"(mysql|postgres)""#, 2),
    present("security group attachment", r"vpc_security_group_ids", 3),
];

/// Marker that makes the containerized path eligible
pub const ALTERNATE_MARKER: &str = r#"resource\s+"aws_ecs_cluster""#;

fn compile(category: Category, defs: &[PresentDef]) -> Result<Vec<Rule>, regex::Error> {
    defs.iter()
        .map(|def| {
            Ok(Rule {
                category,
                label: def.label,
                weight: def.weight,
                optional: def.optional,
                check: Check::Present(Box::new(RegexMatcher::new(def.pattern)?)),
            })
        })
        .collect()
}

fn variables_rules() -> Result<Vec<Rule>, regex::Error> {
    Ok(vec![
        Rule {
            category: Category::Variables,
            label: "variables defined",
            weight: 3,
            optional: false,
            check: Check::Tiered {
                matcher: Box::new(RegexMatcher::new(r#"variable\s+"[^"]+""#)?),
                tiers: vec![
                    Tier {
                        min_count: 10,
                        points: 3,
                    },
                    Tier {
                        min_count: 5,
                        points: 2,
                    },
                ],
                shortfall: "need more",
            },
        },
        Rule {
            category: Category::Variables,
            label: "variable descriptions",
            weight: 2,
            optional: false,
            check: Check::Coverage {
                numerator: Box::new(RegexMatcher::new(r"description\s*=")?),
                denominator: Box::new(RegexMatcher::new(r#"variable\s+"[^"]+""#)?),
                min_percent: 80,
                consolation: 1,
                shortfall: "incomplete",
            },
        },
    ])
}

/// The full set of sections, including both compute variants
#[derive(Debug)]
pub struct Catalogue {
    pub provider: SectionSpec,
    pub networking: SectionSpec,
    pub security: SectionSpec,
    pub load_balancer: SectionSpec,
    pub compute_traditional: SectionSpec,
    pub compute_containerized: SectionSpec,
    pub database: SectionSpec,
    pub variables: SectionSpec,
    pub alternate_marker: Box<dyn Matcher>,
}

static STANDARD: OnceLock<Catalogue> = OnceLock::new();

impl Catalogue {
    /// Built-in catalogue, compiled once per process
    pub fn standard() -> &'static Catalogue {
        STANDARD.get_or_init(|| Catalogue::build().expect("built-in rule patterns are valid"))
    }

    pub fn build() -> Result<Catalogue, regex::Error> {
        Ok(Catalogue {
            provider: SectionSpec {
                category: Category::Provider,
                title: "Provider Config",
                file: MAIN_FILE,
                missing_label: "main config not found",
                max_points: 5,
                rules: compile(Category::Provider, PROVIDER_RULES)?,
            },
            networking: SectionSpec {
                category: Category::Networking,
                title: "VPC & Networking",
                file: NETWORKING_FILE,
                missing_label: "networking config not found",
                max_points: 20,
                rules: compile(Category::Networking, NETWORKING_RULES)?,
            },
            security: SectionSpec {
                category: Category::Security,
                title: "Security Groups",
                file: SECURITY_FILE,
                missing_label: "security config not found",
                max_points: 10,
                rules: compile(Category::Security, SECURITY_RULES)?,
            },
            load_balancer: SectionSpec {
                category: Category::LoadBalancer,
                title: "Application Load Balancer",
                file: LOAD_BALANCER_FILE,
                missing_label: "load balancer config not found",
                max_points: 20,
                rules: compile(Category::LoadBalancer, LOAD_BALANCER_RULES)?,
            },
            compute_traditional: SectionSpec {
                category: Category::Compute,
                title: "EC2 Instances",
                file: COMPUTE_FILE,
                missing_label: "compute config not found",
                max_points: 25,
                rules: compile(Category::Compute, COMPUTE_RULES)?,
            },
            compute_containerized: SectionSpec {
                category: Category::Compute,
                title: "ECS Configuration",
                file: CONTAINER_FILE,
                missing_label: "container config not found",
                max_points: 25,
                rules: compile(Category::Compute, CONTAINER_RULES)?,
            },
            database: SectionSpec {
                category: Category::Database,
                title: "RDS Database",
                file: DATABASE_FILE,
                missing_label: "database config not found",
                max_points: 15,
                rules: compile(Category::Database, DATABASE_RULES)?,
            },
            variables: SectionSpec {
                category: Category::Variables,
                title: "Variables",
                file: VARIABLES_FILE,
                missing_label: "variables config not found",
                max_points: 5,
                rules: variables_rules()?,
            },
            alternate_marker: Box::new(RegexMatcher::new(ALTERNATE_MARKER)?),
        })
    }

    /// Sections in slot order with the given compute section in slot five
    pub fn active_sections<'a>(&'a self, compute: &'a SectionSpec) -> Vec<&'a SectionSpec> {
        vec![
            &self.provider,
            &self.networking,
            &self.security,
            &self.load_balancer,
            compute,
            &self.database,
            &self.variables,
        ]
    }
}
