//! Pipeline parameters.
//!
//! [`PipelineConfig`] groups everything a
//! [`RunPipelineUseCase`](crate::use_cases::run_pipeline::RunPipelineUseCase)
//! needs at construction: how many solvers, how wide the review pool is,
//! how backend calls are retried, and which prompts the stages use.

use crate::generation::RetryPolicy;
use serde::{Deserialize, Serialize};
use tribunal_domain::{AgentId, PromptSet};

/// Pipeline construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of solver agents (`solver_1..=solver_n`).
    pub solver_count: usize,
    /// Worker pool size for the peer-review fan-out.
    pub review_concurrency: usize,
    /// Retry policy for every backend call.
    pub retry: RetryPolicy,
    /// System prompts for the stages.
    pub prompts: PromptSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            solver_count: 3,
            review_concurrency: 3,
            retry: RetryPolicy::default(),
            prompts: PromptSet::default(),
        }
    }
}

impl PipelineConfig {
    // ==================== Builder Methods ====================

    pub fn with_solver_count(mut self, count: usize) -> Self {
        self.solver_count = count;
        self
    }

    pub fn with_review_concurrency(mut self, workers: usize) -> Self {
        self.review_concurrency = workers;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Solver identities in pipeline order.
    pub fn agents(&self) -> Vec<AgentId> {
        AgentId::solvers(self.solver_count)
    }
}
