//! Prompt templates for each pipeline stage

use crate::core::agent::AgentId;
use crate::pipeline::value_objects::{Review, Solution};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// System prompts used by the stages
///
/// Defaults are built in; a prompt directory can override any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    pub role_assessment: String,
    pub solver: String,
    pub reviewer: String,
    pub judge: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            role_assessment: PromptTemplate::role_assessment_system().to_string(),
            solver: PromptTemplate::solver_system().to_string(),
            reviewer: PromptTemplate::reviewer_system().to_string(),
            judge: PromptTemplate::judge_system().to_string(),
        }
    }
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for role self-assessment
    pub fn role_assessment_system() -> &'static str {
        r#"You are one member of a panel of problem solvers.
Before solving, assess which role you are best suited for on this problem: Solver, Reviewer, or Judge.
Respond with a JSON object: {"preferred_role": string, "confidence": number between 0 and 1, "reasoning": string}."#
    }

    /// System prompt for solving and refining
    pub fn solver_system() -> &'static str {
        r#"You are an expert problem solver.
Solve the problem step by step. Number each step, explain the reasoning, and state the intermediate answer.
If you are given an original solution together with peer reviews, produce an improved solution that addresses valid criticism.
Give a final answer and your confidence between 0 and 1."#
    }

    /// System prompt for peer review
    pub fn reviewer_system() -> &'static str {
        r#"You are a critical reviewer evaluating another expert's solution.
Identify strengths, weaknesses and concrete errors, suggest changes, and score the solution.
Be fair but thorough. Echo the reviewer_id and the solution's solver_id as solution_id."#
    }

    /// System prompt for the judge
    pub fn judge_system() -> &'static str {
        r#"You are the judge of a panel of problem solvers.
You receive refined solutions and the peer reviews written about them.
Select the single best solution. The winner must be the solver_id of one of the refined solutions.
Give your confidence between 0 and 1 and explain your reasoning."#
    }

    /// Append the output contract to a system prompt.
    pub fn with_schema(system_prompt: &str, schema: Option<&Value>) -> String {
        match schema {
            Some(schema) => format!(
                "{}\n\nRespond with a single JSON object and nothing else. It must match this JSON Schema:\n{}",
                system_prompt.trim_end(),
                serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string())
            ),
            None => system_prompt.to_string(),
        }
    }

    /// User payload for role self-assessment
    pub fn role_assessment_payload(agent_id: AgentId, question: &str) -> String {
        format!("Role self-assessment for {}:\n{}", agent_id, question)
    }

    /// User payload for solving
    pub fn solver_payload(question: &str) -> String {
        question.to_string()
    }

    /// User payload for reviewing one solution
    pub fn review_payload(reviewer_id: AgentId, solution: &Solution) -> String {
        json!({
            "reviewer_id": reviewer_id,
            "solution": solution,
        })
        .to_string()
    }

    /// User payload for refining a solution with the reviews that target it
    pub fn refinement_payload(original: &Solution, reviews: &[&Review]) -> String {
        json!({
            "original_solution": original,
            "reviews": reviews,
        })
        .to_string()
    }

    /// User payload for the judge
    pub fn judge_payload(refined: &[Solution], reviews: &[Review]) -> String {
        json!({
            "refined_solutions": refined,
            "peer_reviews": reviews,
        })
        .to_string()
    }
}
