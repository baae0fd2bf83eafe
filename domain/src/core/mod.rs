//! Core domain concepts shared across all subdomains.
//!
//! - [`agent::AgentId`]: solver and judge identities
//! - [`problem::Problem`]: a validated problem to pose to the tribunal
//! - [`error::DomainError`]: domain-level errors

pub mod agent;
pub mod error;
pub mod problem;
