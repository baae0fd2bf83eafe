//! Run Batch use case
//!
//! Runs a problem set through the pipeline. Problems share nothing: a fatal
//! failure on one problem is recorded and the batch moves on.

use super::run_pipeline::RunPipelineUseCase;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::result_store::{NoResultStore, ResultStore};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tribunal_domain::{PipelineOutcome, Problem, ProblemJudgment};

/// A problem whose run aborted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedProblem {
    pub problem_id: String,
    pub stage: Option<String>,
    pub error: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Completed runs, in problem order
    pub completed: Vec<PipelineOutcome>,
    /// Aborted runs, in problem order
    pub failed: Vec<FailedProblem>,
}

impl BatchReport {
    /// The `[{problem_id, judgment}]` collection for completed problems
    pub fn judgments(&self) -> Vec<ProblemJudgment> {
        self.completed
            .iter()
            .map(|outcome| ProblemJudgment {
                problem_id: outcome.problem_id.clone(),
                judgment: outcome.judgment.clone(),
            })
            .collect()
    }

    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Use case for running every problem of a batch
pub struct RunBatchUseCase {
    pipeline: Arc<RunPipelineUseCase>,
    store: Arc<dyn ResultStore>,
    problem_concurrency: usize,
}

impl RunBatchUseCase {
    pub fn new(pipeline: Arc<RunPipelineUseCase>) -> Self {
        Self {
            pipeline,
            store: Arc::new(NoResultStore),
            problem_concurrency: 1,
        }
    }

    /// Where the batch-wide judgment collection is written.
    pub fn with_result_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = store;
        self
    }

    /// Run up to `limit` problems at once (at least 1).
    pub fn with_problem_concurrency(mut self, limit: usize) -> Self {
        self.problem_concurrency = limit.max(1);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, problems: Vec<Problem>) -> BatchReport {
        self.execute_with_progress(problems, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        problems: Vec<Problem>,
        progress: &dyn ProgressNotifier,
    ) -> BatchReport {
        let started_at = Utc::now();
        info!(
            problems = problems.len(),
            concurrency = self.problem_concurrency,
            "Starting batch"
        );

        let results: Vec<_> = stream::iter(problems)
            .map(|problem| async move {
                let problem_id = problem.id().to_string();
                let result = self.pipeline.execute_with_progress(problem, progress).await;
                (problem_id, result)
            })
            .buffered(self.problem_concurrency)
            .collect()
            .await;

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        for (problem_id, result) in results {
            match result {
                Ok(outcome) => completed.push(outcome),
                Err(e) => failed.push(FailedProblem {
                    problem_id,
                    stage: e.stage().map(|s| s.as_str().to_string()),
                    error: e.to_string(),
                }),
            }
        }

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            completed,
            failed,
        };

        if let Err(e) = self.store.save_all_judgments(&report.judgments()) {
            warn!(error = %e, "Failed to persist judgments");
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Batch complete"
        );
        report
    }
}
