//! Final adjudication.

use super::{StageContext, StageError, StageOutput};
use crate::generation::GenerationResult;
use tracing::{info, warn};
use tribunal_domain::{
    AgentId, DomainError, Judgment, JudgmentDraft, PromptTemplate, Review, Solution, Stage,
    StructuredOutput,
};

/// Picks one winning refined solution
#[derive(Debug, Clone)]
pub struct JudgeStage {
    system_prompt: String,
}

impl JudgeStage {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: PromptTemplate::with_schema(system_prompt, JudgmentDraft::schema()),
        }
    }

    /// Judge the refined solutions.
    ///
    /// A verdict naming an agent outside `refined` is treated like any other
    /// unusable output and replaced by the default judgment.
    pub async fn run(
        &self,
        ctx: StageContext<'_>,
        refined: &[Solution],
        reviews: &[Review],
    ) -> Result<StageOutput<Judgment>, StageError> {
        if refined.is_empty() {
            return Err(DomainError::InvariantViolation(
                "no refined solutions to judge".to_string(),
            )
            .into());
        }

        ctx.progress.on_stage_start(Stage::Judging, 1);

        let payload = PromptTemplate::judge_payload(refined, reviews);
        let result = ctx
            .client
            .invoke::<JudgmentDraft>(
                &ctx.call_site(Stage::Judging, AgentId::Judge),
                &self.system_prompt,
                &payload,
            )
            .await?;

        let resolved = match result {
            GenerationResult::Parsed(draft) => match draft.resolve(refined) {
                Ok(judgment) => Some(judgment),
                Err(e) => {
                    warn!(problem = ctx.problem_id, error = %e, "Judge named an unknown winner");
                    None
                }
            },
            GenerationResult::Fallback(_) => None,
        };

        let fell_back = resolved.is_none();
        let records = match resolved {
            Some(judgment) => judgment,
            None => Judgment::default_for(refined)?,
        };

        info!(
            problem = ctx.problem_id,
            winner = %records.winner,
            confidence = records.confidence,
            fallback = fell_back,
            "Verdict"
        );
        ctx.progress
            .on_task_complete(Stage::Judging, AgentId::Judge, fell_back);
        ctx.progress.on_stage_complete(Stage::Judging);

        Ok(StageOutput {
            records,
            fallbacks: usize::from(fell_back),
        })
    }
}
