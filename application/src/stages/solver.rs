//! Independent solving.

use super::{StageContext, StageError, StageOutput};
use tracing::{debug, info};
use tribunal_domain::{
    AgentId, PromptTemplate, Solution, SolutionDraft, Stage, StructuredOutput,
};

/// Produces one solution per agent, in agent order
#[derive(Debug, Clone)]
pub struct SolverStage {
    system_prompt: String,
}

impl SolverStage {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: PromptTemplate::with_schema(system_prompt, SolutionDraft::schema()),
        }
    }

    pub async fn run(
        &self,
        ctx: StageContext<'_>,
        question: &str,
        agents: &[AgentId],
    ) -> Result<StageOutput<Vec<Solution>>, StageError> {
        info!(problem = ctx.problem_id, agents = agents.len(), "Solving");
        ctx.progress.on_stage_start(Stage::Solving, agents.len());

        let payload = PromptTemplate::solver_payload(question);
        let mut records = Vec::with_capacity(agents.len());
        let mut fallbacks = 0;

        for &agent in agents {
            let result = ctx
                .client
                .invoke::<SolutionDraft>(
                    &ctx.call_site(Stage::Solving, agent),
                    &self.system_prompt,
                    &payload,
                )
                .await?;

            let (solution, fell_back) = result
                .map(|draft| draft.stamp(agent))
                .resolve(|| Solution::empty(agent));

            debug!(
                agent = %agent,
                answer = %solution.final_answer,
                fallback = fell_back,
                "Solution ready"
            );
            fallbacks += usize::from(fell_back);
            ctx.progress.on_task_complete(Stage::Solving, agent, fell_back);
            records.push(solution);
        }

        ctx.progress.on_stage_complete(Stage::Solving);
        Ok(StageOutput { records, fallbacks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::ports::generation_backend::BackendError;
    use crate::ports::progress::NoProgress;
    use crate::stages::test_support::{FnBackend, QueueBackend, VALID_SOLUTION, client};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_one_solution_per_agent_in_order() {
        let backend = Arc::new(FnBackend::new(|_| Ok(VALID_SOLUTION.to_string())));
        let client = client(backend);
        let ctx = StageContext::new("p1", &client, &NoProgress);

        let output = SolverStage::new(PromptTemplate::solver_system())
            .run(ctx, "2+2", &AgentId::solvers(3))
            .await
            .unwrap();

        let ids: Vec<_> = output.records.iter().map(|s| s.agent_id).collect();
        assert_eq!(ids, AgentId::solvers(3));
        assert_eq!(output.fallbacks, 0);
        assert_eq!(output.records[2].final_answer, "4");
    }

    #[tokio::test]
    async fn test_non_json_output_yields_exact_empty_solution() {
        let backend = Arc::new(QueueBackend::new(vec![
            Ok(VALID_SOLUTION.to_string()),
            Ok("The answer is four.".to_string()),
        ]));
        let client = client(backend);
        let ctx = StageContext::new("p1", &client, &NoProgress);

        let output = SolverStage::new("solve")
            .run(ctx, "2+2", &AgentId::solvers(2))
            .await
            .unwrap();

        assert_eq!(output.fallbacks, 1);
        assert_eq!(
            output.records[1],
            Solution {
                agent_id: AgentId::Solver(2),
                steps: Vec::new(),
                final_answer: String::new(),
                confidence: 0.5,
            }
        );
    }

    #[tokio::test]
    async fn test_backend_claimed_identity_is_overwritten() {
        let backend = Arc::new(FnBackend::new(|_| {
            Ok(r#"{"solver_id": "judge", "steps": [], "final_answer": "4", "confidence": 1.0}"#
                .to_string())
        }));
        let client = client(backend);
        let ctx = StageContext::new("p1", &client, &NoProgress);

        let output = SolverStage::new("solve")
            .run(ctx, "2+2", &[AgentId::Solver(1)])
            .await
            .unwrap();

        assert_eq!(output.records[0].agent_id, AgentId::Solver(1));
        assert_eq!(output.fallbacks, 0);
    }

    #[tokio::test]
    async fn test_transport_exhaustion_aborts_stage() {
        let backend = Arc::new(FnBackend::new(|_| Err(BackendError::Timeout)));
        let client = client(backend.clone());
        let ctx = StageContext::new("p1", &client, &NoProgress);

        let err = SolverStage::new("solve")
            .run(ctx, "2+2", &AgentId::solvers(3))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StageError::Generation(GenerationError::TransportExhausted { attempts: 2, .. })
        ));
        assert_eq!(backend.call_count(), 2);
    }
}
