//! Refinement against received reviews.

use super::{StageContext, StageError, StageOutput};
use tracing::{debug, warn};
use tribunal_domain::{PromptTemplate, Review, Solution, SolutionDraft, Stage, StructuredOutput};

/// Re-invokes each author with its own solution and the reviews that target it
#[derive(Debug, Clone)]
pub struct RefinementStage {
    system_prompt: String,
}

impl RefinementStage {
    /// Refinement uses the solver prompt and the solver's output contract.
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: PromptTemplate::with_schema(system_prompt, SolutionDraft::schema()),
        }
    }

    pub async fn run(
        &self,
        ctx: StageContext<'_>,
        solutions: &[Solution],
        reviews: &[Review],
    ) -> Result<StageOutput<Vec<Solution>>, StageError> {
        ctx.progress
            .on_stage_start(Stage::Refinement, solutions.len());

        let mut records = Vec::with_capacity(solutions.len());
        let mut fallbacks = 0;

        for original in solutions {
            let agent = original.agent_id;
            let received: Vec<&Review> = reviews.iter().filter(|r| r.targets(agent)).collect();
            debug!(agent = %agent, reviews = received.len(), "Refining");

            let payload = PromptTemplate::refinement_payload(original, &received);
            let result = ctx
                .client
                .invoke::<SolutionDraft>(
                    &ctx.call_site(Stage::Refinement, agent),
                    &self.system_prompt,
                    &payload,
                )
                .await?;

            let (refined, fell_back) = result
                .map(|draft| draft.stamp(agent))
                .resolve(|| original.clone());

            if fell_back {
                warn!(agent = %agent, "Keeping original solution");
            }
            fallbacks += usize::from(fell_back);
            ctx.progress
                .on_task_complete(Stage::Refinement, agent, fell_back);
            records.push(refined);
        }

        ctx.progress.on_stage_complete(Stage::Refinement);
        Ok(StageOutput { records, fallbacks })
    }
}
