//! Pipeline value objects - immutable records exchanged between stages.
//!
//! - [`Solution`] - one agent's structured answer (raw or refined)
//! - [`Review`] - one agent's evaluation of another agent's solution
//! - [`Judgment`] - the judge's final verdict
//! - [`RoleAssessment`] - an agent's advisory self-assessment
//!
//! The `*Draft` types are what the backend is asked to produce. Drafts never
//! carry a trusted identity; the stage that requested them stamps one on.

use crate::core::agent::AgentId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One reasoning step of a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub step: i64,
    pub reasoning: String,
    pub answer: String,
}

/// A solution as produced by the backend, before identity stamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionDraft {
    pub steps: Vec<SolutionStep>,
    pub final_answer: String,
    pub confidence: f64,
}

impl SolutionDraft {
    /// Attach the identity of the agent that was actually invoked.
    pub fn stamp(self, agent_id: AgentId) -> Solution {
        Solution {
            agent_id,
            steps: self.steps,
            final_answer: self.final_answer,
            confidence: self.confidence,
        }
    }
}

/// A candidate solution owned by one solver agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Persisted as `solver_id` to match the solution schema
    #[serde(rename = "solver_id")]
    pub agent_id: AgentId,
    pub steps: Vec<SolutionStep>,
    pub final_answer: String,
    pub confidence: f64,
}

/// Body of a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvaluation {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub errors: Vec<Value>,
    pub suggested_changes: Vec<String>,
    pub scores: BTreeMap<String, f64>,
}

/// A review as produced by the backend, before identity stamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub reviewer_id: String,
    pub solution_id: String,
    pub evaluation: ReviewEvaluation,
}

impl ReviewDraft {
    /// Attach the scheduled reviewer/solution pair.
    ///
    /// The ids the backend echoed back are discarded so that a review can
    /// never end up self-targeted or attributed to the wrong pair.
    pub fn stamp(self, reviewer_id: AgentId, solution_id: AgentId) -> Review {
        Review {
            reviewer_id,
            solution_id,
            evaluation: self.evaluation,
        }
    }
}

/// Review of one agent's solution by another agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer_id: AgentId,
    pub solution_id: AgentId,
    pub evaluation: ReviewEvaluation,
}

impl Review {
    /// Whether this review targets the given agent's solution
    pub fn targets(&self, agent_id: AgentId) -> bool {
        self.solution_id == agent_id
    }
}

/// A verdict as produced by the backend, before the winner is checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentDraft {
    pub winner: String,
    pub confidence: f64,
    pub reasoning: String,
}

impl JudgmentDraft {
    /// Resolve the winner against the refined solutions actually judged.
    pub fn resolve(self, candidates: &[Solution]) -> Result<Judgment, DomainError> {
        let winner = candidates
            .iter()
            .map(|s| s.agent_id)
            .find(|id| id.to_string() == self.winner)
            .ok_or(DomainError::UnknownWinner {
                winner: self.winner,
            })?;

        Ok(Judgment {
            winner,
            confidence: self.confidence,
            reasoning: self.reasoning,
        })
    }
}

/// Final verdict of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub winner: AgentId,
    pub confidence: f64,
    pub reasoning: String,
}

/// Advisory self-assessment reported by an agent
///
/// Only best-effort parsed; nothing downstream branches on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssessment {
    pub agent_id: AgentId,
    pub assessment: Value,
}

/// Entry of the batch-wide judgment collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemJudgment {
    pub problem_id: String,
    pub judgment: Judgment,
}
