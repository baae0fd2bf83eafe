//! Port for persisting per-stage results.

use thiserror::Error;
use tribunal_domain::{Judgment, ProblemJudgment, Review, RoleAssessment, Solution};

/// Persistence failure
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output of one stage, borrowed for persistence
#[derive(Debug, Clone, Copy)]
pub enum StageRecord<'a> {
    Roles(&'a [RoleAssessment]),
    RawSolutions(&'a [Solution]),
    PeerReviews(&'a [Review]),
    RefinedSolutions(&'a [Solution]),
    FinalJudgment(&'a Judgment),
}

impl StageRecord<'_> {
    /// Name of the record, used as a key suffix by stores
    pub fn name(&self) -> &'static str {
        match self {
            StageRecord::Roles(_) => "roles",
            StageRecord::RawSolutions(_) => "raw_solutions",
            StageRecord::PeerReviews(_) => "peer_reviews",
            StageRecord::RefinedSolutions(_) => "refined_solutions",
            StageRecord::FinalJudgment(_) => "final_judgment",
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            StageRecord::Roles(r) => serde_json::to_value(r),
            StageRecord::RawSolutions(s) | StageRecord::RefinedSolutions(s) => {
                serde_json::to_value(s)
            }
            StageRecord::PeerReviews(r) => serde_json::to_value(r),
            StageRecord::FinalJudgment(j) => serde_json::to_value(j),
        }
    }
}

/// Store for stage outputs, keyed by problem id
///
/// Callers treat failures as non-fatal: a run that cannot be persisted still
/// produces its verdict.
pub trait ResultStore: Send + Sync {
    fn save_stage(&self, problem_id: &str, record: StageRecord<'_>) -> Result<(), StoreError>;

    /// Save the batch-wide `[{problem_id, judgment}]` collection
    fn save_all_judgments(&self, judgments: &[ProblemJudgment]) -> Result<(), StoreError>;
}

/// Keeps nothing.
pub struct NoResultStore;

impl ResultStore for NoResultStore {
    fn save_stage(&self, _problem_id: &str, _record: StageRecord<'_>) -> Result<(), StoreError> {
        Ok(())
    }

    fn save_all_judgments(&self, _judgments: &[ProblemJudgment]) -> Result<(), StoreError> {
        Ok(())
    }
}
