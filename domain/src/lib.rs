//! Domain layer for agent-tribunal
//!
//! This crate contains the core records, identities and output contracts.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! A tribunal run takes one [`Problem`] through five stages:
//!
//! 1. **Role assignment**: every solver self-reports a preferred role (advisory)
//! 2. **Solving**: every solver produces a [`Solution`]
//! 3. **Peer review**: every solver reviews every other solver's solution
//! 4. **Refinement**: every solver improves its solution using the reviews it received
//! 5. **Judging**: the judge picks a winning solution ([`Judgment`])
//!
//! The backend is untrusted. Every structured response passes through
//! [`schema::structured::parse_structured`], and every stage has a
//! deterministic fallback value (see [`pipeline::fallback`]).

pub mod config;
pub mod core;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    agent::{AgentId, AgentRole},
    error::DomainError,
    problem::Problem,
};
pub use pipeline::{
    entities::{FallbackStats, PipelineOutcome, PipelineRun, RunState, Stage},
    value_objects::{
        Judgment, JudgmentDraft, ProblemJudgment, Review, ReviewDraft, ReviewEvaluation,
        RoleAssessment, Solution, SolutionDraft, SolutionStep,
    },
};
pub use prompt::{PromptSet, PromptTemplate};
pub use schema::{
    structured::{StructuredOutput, parse_structured},
    validation::ValidationError,
};
