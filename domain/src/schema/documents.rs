//! JSON Schema documents for every structured backend output.
//!
//! These are the contracts quoted to the backend in system prompts and
//! enforced by [`validate`](super::validation::validate). The persisted
//! solution shape requires `solver_id`; the draft shape the backend is asked
//! for does not, since the identity is stamped by the stage anyway.

use serde_json::{Value, json};
use std::sync::LazyLock;

fn step_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "step": {"type": "integer"},
            "reasoning": {"type": "string"},
            "answer": {"type": "string"}
        },
        "required": ["step", "reasoning", "answer"]
    })
}

static SOLUTION: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "solver_id": {"type": "string"},
            "steps": {"type": "array", "items": step_schema()},
            "final_answer": {"type": "string"},
            "confidence": {"type": "number"}
        },
        "required": ["solver_id", "steps", "final_answer", "confidence"]
    })
});

static SOLUTION_DRAFT: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "solver_id": {"type": "string"},
            "steps": {"type": "array", "items": step_schema()},
            "final_answer": {"type": "string"},
            "confidence": {"type": "number"}
        },
        "required": ["steps", "final_answer", "confidence"]
    })
});

static REVIEW: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "reviewer_id": {"type": "string"},
            "solution_id": {"type": "string"},
            "evaluation": {
                "type": "object",
                "properties": {
                    "strengths": {"type": "array", "items": {"type": "string"}},
                    "weaknesses": {"type": "array", "items": {"type": "string"}},
                    "errors": {"type": "array"},
                    "suggested_changes": {"type": "array", "items": {"type": "string"}},
                    "scores": {"type": "object"}
                },
                "required": ["strengths", "weaknesses", "errors", "suggested_changes", "scores"]
            }
        },
        "required": ["reviewer_id", "solution_id", "evaluation"]
    })
});

static JUDGMENT: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "winner": {"type": "string"},
            "confidence": {"type": "number"},
            "reasoning": {"type": "string"}
        },
        "required": ["winner", "confidence", "reasoning"]
    })
});

/// Persisted solution record
pub fn solution_schema() -> &'static Value {
    &SOLUTION
}

/// Solution as requested from the backend (no identity required)
pub fn solution_draft_schema() -> &'static Value {
    &SOLUTION_DRAFT
}

pub fn review_schema() -> &'static Value {
    &REVIEW
}

pub fn judgment_schema() -> &'static Value {
    &JUDGMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            required(solution_schema()),
            vec!["solver_id", "steps", "final_answer", "confidence"]
        );
        assert_eq!(
            required(solution_draft_schema()),
            vec!["steps", "final_answer", "confidence"]
        );
        assert_eq!(
            required(review_schema()),
            vec!["reviewer_id", "solution_id", "evaluation"]
        );
        assert_eq!(
            required(&review_schema()["properties"]["evaluation"]),
            vec!["strengths", "weaknesses", "errors", "suggested_changes", "scores"]
        );
        assert_eq!(
            required(judgment_schema()),
            vec!["winner", "confidence", "reasoning"]
        );
    }
}
