//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use tribunal_domain::{AgentId, Judgment, Stage};

/// Callback for progress updates during pipeline execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain text, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a problem starts its pipeline run
    fn on_problem_start(&self, _problem_id: &str) {}

    /// Called when a stage starts
    fn on_stage_start(&self, stage: Stage, total_tasks: usize);

    /// Called when one invocation within a stage completes
    ///
    /// `fallback` is true when the backend output was replaced by a default.
    fn on_task_complete(&self, stage: Stage, agent: AgentId, fallback: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: Stage);

    /// Called when a problem finishes with a verdict
    fn on_problem_complete(&self, _problem_id: &str, _judgment: &Judgment) {}

    /// Called when a problem aborts
    fn on_problem_failed(&self, _problem_id: &str, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: Stage, _agent: AgentId, _fallback: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
