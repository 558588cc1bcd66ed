//! tiercheck - compliance scoring for three-tier Terraform projects
//!
//! Pattern-based static audit of the project files plus an optional live
//! cross-check of a LocalStack or AWS environment.

pub mod audit;
pub mod cli;
pub mod config;
pub mod external_tool;
pub mod live;
pub mod models;
pub mod reporters;
pub mod validate;
