//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No solver agents configured")]
    NoAgents,

    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Judge winner '{winner}' is not one of the refined solutions")]
    UnknownWinner { winner: String },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    /// Check if this error indicates a broken pipeline invariant
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DomainError::InvariantViolation(_))
    }
}
