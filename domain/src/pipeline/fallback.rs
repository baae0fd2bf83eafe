//! Deterministic substitutes used when the backend output cannot be trusted.
//!
//! Every stage has exactly one fallback value. They are pure functions of the
//! identities involved, so a run that falls back everywhere is still fully
//! reproducible.

use super::value_objects::{Judgment, Review, ReviewEvaluation, RoleAssessment, Solution};
use crate::core::agent::AgentId;
use crate::core::error::DomainError;
use serde_json::json;
use std::collections::BTreeMap;

/// Confidence of an empty solution
pub const EMPTY_SOLUTION_CONFIDENCE: f64 = 0.5;

/// Score given to every criterion of a neutral review
pub const NEUTRAL_REVIEW_SCORE: f64 = 0.5;

/// Criteria scored by a neutral review
pub const NEUTRAL_REVIEW_CRITERIA: [&str; 2] = ["correctness", "clarity"];

/// Confidence of the default judgment
pub const DEFAULT_JUDGMENT_CONFIDENCE: f64 = 0.7;

/// Reasoning attached to the default judgment
pub const DEFAULT_JUDGMENT_REASONING: &str =
    "Defaulted to first solver due to invalid judge output.";

impl Solution {
    /// Solution with no steps and no answer.
    pub fn empty(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            steps: Vec::new(),
            final_answer: String::new(),
            confidence: EMPTY_SOLUTION_CONFIDENCE,
        }
    }
}

impl Review {
    /// Review with no findings and middle scores.
    pub fn neutral(reviewer_id: AgentId, solution_id: AgentId) -> Self {
        let scores = NEUTRAL_REVIEW_CRITERIA
            .iter()
            .map(|c| (c.to_string(), NEUTRAL_REVIEW_SCORE))
            .collect::<BTreeMap<_, _>>();

        Self {
            reviewer_id,
            solution_id,
            evaluation: ReviewEvaluation {
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                errors: Vec::new(),
                suggested_changes: Vec::new(),
                scores,
            },
        }
    }
}

impl Judgment {
    /// Verdict for the first refined solution.
    ///
    /// An empty candidate set means an earlier stage produced nothing, which
    /// cannot happen with a fixed, non-empty agent set. It is reported as an
    /// invariant violation rather than papered over.
    pub fn default_for(candidates: &[Solution]) -> Result<Self, DomainError> {
        let first = candidates.first().ok_or_else(|| {
            DomainError::InvariantViolation("no refined solutions to judge".to_string())
        })?;

        Ok(Self {
            winner: first.agent_id,
            confidence: DEFAULT_JUDGMENT_CONFIDENCE,
            reasoning: DEFAULT_JUDGMENT_REASONING.to_string(),
        })
    }
}

impl RoleAssessment {
    /// Assessment claiming the solver role.
    pub fn default_for(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            assessment: json!({
                "preferred_role": "Solver",
                "confidence": 0.8,
                "reasoning": "Defaulted to Solver."
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_solution() {
        let s = Solution::empty(AgentId::Solver(2));
        assert_eq!(s.agent_id, AgentId::Solver(2));
        assert!(s.steps.is_empty());
        assert_eq!(s.final_answer, "");
        assert_eq!(s.confidence, 0.5);
    }

    #[test]
    fn test_neutral_review() {
        let r = Review::neutral(AgentId::Solver(1), AgentId::Solver(3));
        assert_eq!(r.reviewer_id, AgentId::Solver(1));
        assert_eq!(r.solution_id, AgentId::Solver(3));
        assert!(r.evaluation.strengths.is_empty());
        assert!(r.evaluation.errors.is_empty());
        assert_eq!(r.evaluation.scores.len(), 2);
        assert_eq!(r.evaluation.scores["correctness"], 0.5);
        assert_eq!(r.evaluation.scores["clarity"], 0.5);
    }

    #[test]
    fn test_default_judgment_picks_first() {
        let candidates = vec![
            Solution::empty(AgentId::Solver(2)),
            Solution::empty(AgentId::Solver(1)),
        ];
        let j = Judgment::default_for(&candidates).unwrap();
        assert_eq!(j.winner, AgentId::Solver(2));
        assert_eq!(j.confidence, 0.7);
        assert_eq!(j.reasoning, DEFAULT_JUDGMENT_REASONING);
    }

    #[test]
    fn test_default_judgment_without_candidates_is_violation() {
        let err = Judgment::default_for(&[]).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_default_role() {
        let r = RoleAssessment::default_for(AgentId::Solver(1));
        assert_eq!(r.assessment["preferred_role"], "Solver");
    }
}
