//! Run Pipeline use case
//!
//! Drives one problem through role assignment, solving, peer review,
//! refinement and judging. Stages run strictly in that order; each one sees
//! the complete output of the one before it.

use crate::config::PipelineConfig;
use crate::generation::GenerationClient;
use crate::pool::WorkerPool;
use crate::ports::audit_log::{AuditEvent, AuditEventKind, AuditLogger, NoAuditLogger};
use crate::ports::generation_backend::GenerationBackend;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::result_store::{NoResultStore, ResultStore, StageRecord};
use crate::stages::{
    JudgeStage, PeerReviewCoordinator, RefinementStage, RoleAssigner, SolverStage, StageContext,
    StageError, StageOutput,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use tribunal_domain::{DomainError, PipelineOutcome, PipelineRun, Problem, Stage};

/// Errors that abort a pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunPipelineError {
    #[error("{} stage failed: {source}", .stage.display_name())]
    StageFailed { stage: Stage, source: StageError },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RunPipelineError {
    /// The stage that was running, if the failure happened inside one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunPipelineError::StageFailed { stage, .. } => Some(*stage),
            RunPipelineError::Domain(_) => None,
        }
    }

    /// Whether the backend stayed unreachable for a whole retry budget
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            RunPipelineError::StageFailed {
                source: StageError::Generation(_),
                ..
            }
        )
    }
}

/// Use case for running the tribunal pipeline on one problem
pub struct RunPipelineUseCase {
    client: GenerationClient,
    config: PipelineConfig,
    store: Arc<dyn ResultStore>,
    audit: Arc<dyn AuditLogger>,
    roles: RoleAssigner,
    solver: SolverStage,
    review: PeerReviewCoordinator,
    refine: RefinementStage,
    judge: JudgeStage,
}

impl RunPipelineUseCase {
    pub fn new(backend: Arc<dyn GenerationBackend>, config: PipelineConfig) -> Self {
        let prompts = &config.prompts;
        Self {
            client: GenerationClient::new(backend, config.retry),
            roles: RoleAssigner::new(&prompts.role_assessment),
            solver: SolverStage::new(&prompts.solver),
            review: PeerReviewCoordinator::new(
                &prompts.reviewer,
                WorkerPool::new(config.review_concurrency),
            ),
            refine: RefinementStage::new(&prompts.solver),
            judge: JudgeStage::new(&prompts.judge),
            store: Arc::new(NoResultStore),
            audit: Arc::new(NoAuditLogger),
            config,
        }
    }

    /// Record every backend call and stage boundary.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.client = self.client.with_audit_logger(Arc::clone(&audit));
        self.audit = audit;
        self
    }

    /// Persist each stage's output as it completes.
    pub fn with_result_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = store;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, problem: Problem) -> Result<PipelineOutcome, RunPipelineError> {
        self.execute_with_progress(problem, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        problem: Problem,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineOutcome, RunPipelineError> {
        let problem_id = problem.id().to_string();
        progress.on_problem_start(&problem_id);

        let result = self.run_stages(problem, &problem_id, progress).await;

        match &result {
            Ok(outcome) => progress.on_problem_complete(&problem_id, &outcome.judgment),
            Err(e) => {
                warn!(problem = %problem_id, error = %e, "Pipeline aborted");
                progress.on_problem_failed(&problem_id, &e.to_string());
            }
        }
        result
    }

    async fn run_stages(
        &self,
        problem: Problem,
        problem_id: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<PipelineOutcome, RunPipelineError> {
        let question = problem.question().to_string();
        let agents = self.config.agents();
        let mut run = PipelineRun::new(problem, agents.clone())?;
        let ctx = StageContext::new(problem_id, &self.client, progress);

        info!(problem = %problem_id, solvers = agents.len(), "Starting pipeline");

        // Stage 1: Role assignment (advisory)
        let roles = self
            .stage(
                problem_id,
                Stage::RoleAssignment,
                self.roles.run(ctx, &question, &agents),
            )
            .await?;
        self.persist(problem_id, StageRecord::Roles(&roles.records));
        run.record_roles(roles.records, roles.fallbacks)?;

        // Stage 2: Solving
        let solutions = self
            .stage(
                problem_id,
                Stage::Solving,
                self.solver.run(ctx, &question, &agents),
            )
            .await?;
        self.persist(problem_id, StageRecord::RawSolutions(&solutions.records));
        run.record_solutions(solutions.records, solutions.fallbacks)?;

        // Stage 3: Peer review
        let reviews = self
            .stage(
                problem_id,
                Stage::PeerReview,
                self.review.run(ctx, run.solutions()),
            )
            .await?;
        self.persist(problem_id, StageRecord::PeerReviews(&reviews.records));
        run.record_reviews(reviews.records, reviews.fallbacks)?;

        // Stage 4: Refinement
        let refined = self
            .stage(
                problem_id,
                Stage::Refinement,
                self.refine.run(ctx, run.solutions(), run.reviews()),
            )
            .await?;
        self.persist(problem_id, StageRecord::RefinedSolutions(&refined.records));
        run.record_refined(refined.records, refined.fallbacks)?;

        // Stage 5: Judging
        let judgment = self
            .stage(
                problem_id,
                Stage::Judging,
                self.judge.run(ctx, run.refined(), run.reviews()),
            )
            .await?;
        self.persist(problem_id, StageRecord::FinalJudgment(&judgment.records));
        run.record_judgment(judgment.records, judgment.fallbacks)?;

        let outcome = run.finish()?;
        info!(
            problem = %problem_id,
            winner = %outcome.judgment.winner,
            fallbacks = outcome.fallbacks.total(),
            "Pipeline complete"
        );
        Ok(outcome)
    }

    /// Run one stage between audit markers.
    async fn stage<T>(
        &self,
        problem_id: &str,
        stage: Stage,
        work: impl Future<Output = Result<StageOutput<T>, StageError>>,
    ) -> Result<StageOutput<T>, RunPipelineError> {
        self.audit.record(AuditEvent::new(
            AuditEventKind::StageStarted,
            json!({ "problem_id": problem_id, "stage": stage.as_str() }),
        ));

        let output = work
            .await
            .map_err(|source| RunPipelineError::StageFailed { stage, source })?;

        if output.fallbacks > 0 {
            info!(
                problem = %problem_id,
                stage = stage.as_str(),
                fallbacks = output.fallbacks,
                "Stage completed with fallbacks"
            );
        }
        self.audit.record(AuditEvent::new(
            AuditEventKind::StageCompleted,
            json!({
                "problem_id": problem_id,
                "stage": stage.as_str(),
                "fallbacks": output.fallbacks,
            }),
        ));
        Ok(output)
    }

    fn persist(&self, problem_id: &str, record: StageRecord<'_>) {
        if let Err(e) = self.store.save_stage(problem_id, record) {
            warn!(
                problem = %problem_id,
                record = record.name(),
                error = %e,
                "Failed to persist stage output"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RetryPolicy;
    use crate::ports::generation_backend::{BackendError, CompletionRequest};
    use crate::ports::result_store::StoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tribunal_domain::{AgentId, ProblemJudgment};

    // ==================== Test Mocks ====================

    /// Answers according to which stage the system prompt belongs to
    struct StageAwareBackend {
        judge_winner: &'static str,
        fail_judge: bool,
        calls: AtomicUsize,
    }

    impl StageAwareBackend {
        fn new(judge_winner: &'static str) -> Self {
            Self {
                judge_winner,
                fail_judge: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for StageAwareBackend {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = match request.agent {
                AgentId::Judge if self.fail_judge => {
                    return Err(BackendError::ConnectionError("down".to_string()));
                }
                AgentId::Judge => json!({
                    "winner": self.judge_winner,
                    "confidence": 0.8,
                    "reasoning": "best steps",
                }),
                _ if request.system_prompt.starts_with("ROLE") => json!({
                    "preferred_role": "Solver",
                    "confidence": 0.5,
                    "reasoning": "default",
                }),
                _ if request.system_prompt.starts_with("REVIEW") => json!({
                    "reviewer_id": request.agent.to_string(),
                    "solution_id": "unknown",
                    "evaluation": {
                        "strengths": [],
                        "weaknesses": ["terse"],
                        "errors": [],
                        "suggested_changes": [],
                        "scores": {"correctness": 1.0}
                    }
                }),
                _ => json!({
                    "steps": [{"step": 1, "reasoning": "2 + 2", "answer": "4"}],
                    "final_answer": "4",
                    "confidence": 0.95,
                }),
            };
            Ok(reply.to_string())
        }

        fn name(&self) -> &str {
            "stage-aware"
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Vec<(String, &'static str)>>,
    }

    impl ResultStore for MemoryStore {
        fn save_stage(&self, problem_id: &str, record: StageRecord<'_>) -> Result<(), StoreError> {
            self.saved
                .lock()
                .unwrap()
                .push((problem_id.to_string(), record.name()));
            Ok(())
        }

        fn save_all_judgments(&self, _judgments: &[ProblemJudgment]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct BrokenStore;

    impl ResultStore for BrokenStore {
        fn save_stage(&self, _problem_id: &str, _record: StageRecord<'_>) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn save_all_judgments(&self, _judgments: &[ProblemJudgment]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    fn config() -> PipelineConfig {
        let prompts = tribunal_domain::PromptSet {
            role_assessment: "ROLE".to_string(),
            solver: "SOLVE".to_string(),
            reviewer: "REVIEW".to_string(),
            judge: "JUDGE".to_string(),
        };
        PipelineConfig::default()
            .with_prompts(prompts)
            .with_retry(RetryPolicy::immediate(2))
    }

    fn problem() -> Problem {
        Problem::try_new("p1", "2+2").unwrap()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_full_run_produces_outcome() {
        let backend = Arc::new(StageAwareBackend::new("solver_2"));
        let store = Arc::new(MemoryStore::default());
        let use_case =
            RunPipelineUseCase::new(backend.clone(), config()).with_result_store(store.clone());

        let outcome = use_case.execute(problem()).await.unwrap();

        assert_eq!(outcome.problem_id, "p1");
        assert_eq!(outcome.roles.len(), 3);
        assert_eq!(outcome.solutions.len(), 3);
        assert_eq!(outcome.reviews.len(), 6);
        assert_eq!(outcome.refined_solutions.len(), 3);
        assert_eq!(outcome.judgment.winner, AgentId::Solver(2));
        assert_eq!(outcome.fallbacks.total(), 0);
        assert_eq!(
            outcome.winning_solution().map(|s| s.final_answer.as_str()),
            Some("4")
        );
        // 3 roles + 3 solutions + 6 reviews + 3 refinements + 1 verdict
        assert_eq!(backend.calls.load(Ordering::SeqCst), 16);

        let saved: Vec<_> = store.saved.lock().unwrap().iter().map(|(_, n)| *n).collect();
        assert_eq!(
            saved,
            vec![
                "roles",
                "raw_solutions",
                "peer_reviews",
                "refined_solutions",
                "final_judgment"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_winner_falls_back_to_first_solver() {
        let backend = Arc::new(StageAwareBackend::new("solver_7"));
        let use_case = RunPipelineUseCase::new(backend, config());

        let outcome = use_case.execute(problem()).await.unwrap();

        assert_eq!(outcome.judgment.winner, AgentId::Solver(1));
        assert_eq!(outcome.fallbacks.get(Stage::Judging), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_with_stage() {
        let backend = Arc::new(StageAwareBackend {
            fail_judge: true,
            ..StageAwareBackend::new("solver_1")
        });
        let use_case = RunPipelineUseCase::new(backend, config());

        let err = use_case.execute(problem()).await.unwrap_err();

        assert!(err.is_transport_failure());
        assert_eq!(err.stage(), Some(Stage::Judging));
    }

    #[tokio::test]
    async fn test_store_failures_do_not_abort() {
        let backend = Arc::new(StageAwareBackend::new("solver_3"));
        let use_case =
            RunPipelineUseCase::new(backend, config()).with_result_store(Arc::new(BrokenStore));

        let outcome = use_case.execute(problem()).await.unwrap();

        assert_eq!(outcome.judgment.winner, AgentId::Solver(3));
    }

    #[tokio::test]
    async fn test_single_solver_skips_reviews() {
        let backend = Arc::new(StageAwareBackend::new("solver_1"));
        let use_case = RunPipelineUseCase::new(backend, config().with_solver_count(1));

        let outcome = use_case.execute(problem()).await.unwrap();

        assert!(outcome.reviews.is_empty());
        assert_eq!(outcome.judgment.winner, AgentId::Solver(1));
    }

    #[tokio::test]
    async fn test_zero_solvers_is_rejected() {
        let backend = Arc::new(StageAwareBackend::new("solver_1"));
        let use_case = RunPipelineUseCase::new(backend.clone(), config().with_solver_count(0));

        let err = use_case.execute(problem()).await.unwrap_err();

        assert_eq!(err, RunPipelineError::Domain(DomainError::NoAgents));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stage_events_are_audited_in_order() {
        struct StageAudit(Mutex<Vec<(AuditEventKind, String)>>);

        impl AuditLogger for StageAudit {
            fn record(&self, event: AuditEvent) {
                if matches!(
                    event.kind,
                    AuditEventKind::StageStarted | AuditEventKind::StageCompleted
                ) {
                    let stage = event.payload["stage"].as_str().unwrap_or("").to_string();
                    self.0.lock().unwrap().push((event.kind, stage));
                }
            }
        }

        let backend = Arc::new(StageAwareBackend::new("solver_1"));
        let audit = Arc::new(StageAudit(Mutex::new(Vec::new())));
        let use_case = RunPipelineUseCase::new(backend, config()).with_audit_logger(audit.clone());

        use_case.execute(problem()).await.unwrap();

        let events = audit.0.lock().unwrap();
        assert_eq!(events.len(), 10);
        let started: Vec<_> = events
            .iter()
            .filter(|(k, _)| *k == AuditEventKind::StageStarted)
            .map(|(_, s)| s.as_str())
            .collect();
        let expected: Vec<_> = Stage::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(started, expected);
    }
}
