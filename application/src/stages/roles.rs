//! Role self-assessment (advisory only).

use super::{StageContext, StageError, StageOutput};
use serde_json::Value;
use tracing::debug;
use tribunal_domain::{AgentId, PromptTemplate, RoleAssessment, Stage, StructuredOutput};

/// Asks every agent which role it would prefer for the problem
///
/// The answers are recorded for observability; no later stage reads them.
#[derive(Debug, Clone)]
pub struct RoleAssigner {
    system_prompt: String,
}

impl RoleAssigner {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: PromptTemplate::with_schema(system_prompt, Value::schema()),
        }
    }

    pub async fn run(
        &self,
        ctx: StageContext<'_>,
        question: &str,
        agents: &[AgentId],
    ) -> Result<StageOutput<Vec<RoleAssessment>>, StageError> {
        ctx.progress
            .on_stage_start(Stage::RoleAssignment, agents.len());

        let mut records = Vec::with_capacity(agents.len());
        let mut fallbacks = 0;

        for &agent in agents {
            let payload = PromptTemplate::role_assessment_payload(agent, question);
            let result = ctx
                .client
                .invoke::<Value>(
                    &ctx.call_site(Stage::RoleAssignment, agent),
                    &self.system_prompt,
                    &payload,
                )
                .await?;

            let (assessment, fell_back) = result
                .map(|assessment| RoleAssessment {
                    agent_id: agent,
                    assessment,
                })
                .resolve(|| RoleAssessment::default_for(agent));

            debug!(agent = %agent, fallback = fell_back, "Role assessed");
            fallbacks += usize::from(fell_back);
            ctx.progress
                .on_task_complete(Stage::RoleAssignment, agent, fell_back);
            records.push(assessment);
        }

        ctx.progress.on_stage_complete(Stage::RoleAssignment);
        Ok(StageOutput { records, fallbacks })
    }
}
