//! All-pairs peer review with bounded parallelism.

use super::{StageContext, StageError, StageOutput};
use crate::generation::{CallSite, GenerationClient, GenerationError};
use crate::pool::WorkerPool;
use std::sync::Arc;
use tracing::{info, warn};
use tribunal_domain::{AgentId, PromptTemplate, Review, ReviewDraft, Solution, Stage, StructuredOutput};

/// Every ordered `(reviewer, solution)` pair with distinct identities
///
/// For `n` solutions this is exactly `n * (n - 1)` pairs, grouped by reviewer.
pub fn review_pairs(solutions: &[Solution]) -> Vec<(AgentId, usize)> {
    solutions
        .iter()
        .flat_map(|reviewer| {
            solutions
                .iter()
                .enumerate()
                .filter(move |(_, target)| target.agent_id != reviewer.agent_id)
                .map(move |(index, _)| (reviewer.agent_id, index))
        })
        .collect()
}

/// Fans review tasks out over a [`WorkerPool`] and joins them all
#[derive(Debug, Clone)]
pub struct PeerReviewCoordinator {
    system_prompt: Arc<str>,
    pool: WorkerPool,
}

impl PeerReviewCoordinator {
    pub fn new(system_prompt: &str, pool: WorkerPool) -> Self {
        Self {
            system_prompt: PromptTemplate::with_schema(system_prompt, ReviewDraft::schema()).into(),
            pool,
        }
    }

    /// Review every solution by every other agent.
    ///
    /// Reviews are returned in pair order (see [`review_pairs`]). A transport
    /// failure is reported only after every sibling task has finished.
    pub async fn run(
        &self,
        ctx: StageContext<'_>,
        solutions: &[Solution],
    ) -> Result<StageOutput<Vec<Review>>, StageError> {
        let pairs = review_pairs(solutions);
        info!(
            problem = ctx.problem_id,
            tasks = pairs.len(),
            workers = self.pool.size(),
            "Peer review"
        );
        ctx.progress.on_stage_start(Stage::PeerReview, pairs.len());

        let tasks: Vec<_> = pairs
            .iter()
            .map(|&(reviewer, index)| {
                let client = ctx.client.clone();
                let system_prompt = Arc::clone(&self.system_prompt);
                let site = ctx.call_site(Stage::PeerReview, reviewer);
                let target = solutions[index].clone();
                async move { review_one(&client, &site, &system_prompt, target).await }
            })
            .collect();

        let results = self
            .pool
            .run_all(tasks, |index, result| {
                let fell_back = matches!(result, Ok((_, true)));
                ctx.progress
                    .on_task_complete(Stage::PeerReview, pairs[index].0, fell_back);
            })
            .await?;

        let mut records = Vec::with_capacity(results.len());
        let mut fallbacks = 0;
        for result in results {
            let (review, fell_back) = result?;
            fallbacks += usize::from(fell_back);
            records.push(review);
        }

        ctx.progress.on_stage_complete(Stage::PeerReview);
        Ok(StageOutput { records, fallbacks })
    }
}

async fn review_one(
    client: &GenerationClient,
    site: &CallSite,
    system_prompt: &str,
    target: Solution,
) -> Result<(Review, bool), GenerationError> {
    let reviewer = site.agent;
    let payload = PromptTemplate::review_payload(reviewer, &target);
    let result = client
        .invoke::<ReviewDraft>(site, system_prompt, &payload)
        .await?;

    let (review, fell_back) = result
        .map(|draft| draft.stamp(reviewer, target.agent_id))
        .resolve(|| Review::neutral(reviewer, target.agent_id));

    if fell_back {
        warn!(reviewer = %reviewer, solution = %target.agent_id, "Using neutral review");
    }
    Ok((review, fell_back))
}
