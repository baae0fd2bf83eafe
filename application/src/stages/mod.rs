//! The five pipeline stages.
//!
//! Each stage takes the previous stage's full output, invokes the backend
//! through the [`GenerationClient`](crate::generation::GenerationClient) and
//! substitutes its deterministic fallback whenever a response is unusable.
//! The only errors a stage returns are fatal ones.

pub mod judge;
pub mod refine;
pub mod review;
pub mod roles;
pub mod solver;

pub use judge::JudgeStage;
pub use refine::RefinementStage;
pub use review::PeerReviewCoordinator;
pub use roles::RoleAssigner;
pub use solver::SolverStage;

use crate::generation::{CallSite, GenerationClient, GenerationError};
use crate::pool::WorkerFailed;
use crate::ports::progress::ProgressNotifier;
use thiserror::Error;
use tribunal_domain::{AgentId, DomainError, Stage};

/// Fatal stage failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Worker(#[from] WorkerFailed),
}

/// Records produced by a stage, plus how many of them are fallbacks
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<T> {
    pub records: T,
    pub fallbacks: usize,
}

/// What every stage needs to talk to the backend for one problem
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub problem_id: &'a str,
    pub client: &'a GenerationClient,
    pub progress: &'a dyn ProgressNotifier,
}

impl<'a> StageContext<'a> {
    pub fn new(
        problem_id: &'a str,
        client: &'a GenerationClient,
        progress: &'a dyn ProgressNotifier,
    ) -> Self {
        Self {
            problem_id,
            client,
            progress,
        }
    }

    fn call_site(&self, stage: Stage, agent: AgentId) -> CallSite {
        CallSite::new(self.problem_id, stage, agent)
    }
}
