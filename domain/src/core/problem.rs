//! Problem value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A problem to be solved by the tribunal (Value Object)
///
/// One problem drives exactly one pipeline run. It is never mutated
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProblemRecord")]
pub struct Problem {
    id: String,
    question: String,
}

impl Problem {
    /// Try to create a new problem, returning None if the question is blank
    pub fn try_new(id: impl Into<String>, question: impl Into<String>) -> Option<Self> {
        let question = question.into();
        if question.trim().is_empty() {
            None
        } else {
            Some(Self {
                id: id.into(),
                question,
            })
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

/// Unchecked wire shape of a [`Problem`]
#[derive(Deserialize)]
struct ProblemRecord {
    id: String,
    question: String,
}

impl TryFrom<ProblemRecord> for Problem {
    type Error = DomainError;

    fn try_from(record: ProblemRecord) -> Result<Self, Self::Error> {
        Problem::try_new(record.id.clone(), record.question).ok_or_else(|| {
            DomainError::InvalidProblem(format!("problem '{}' has a blank question", record.id))
        })
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.id, self.question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_creation() {
        let p = Problem::try_new("p1", "2+2").unwrap();
        assert_eq!(p.id(), "p1");
        assert_eq!(p.question(), "2+2");
    }

    #[test]
    fn test_blank_question_rejected() {
        assert!(Problem::try_new("p1", "").is_none());
        assert!(Problem::try_new("p1", "  \n").is_none());
    }

    #[test]
    fn test_deserialize() {
        let p: Problem = serde_json::from_str(r#"{"id":"p1","question":"2+2"}"#).unwrap();
        assert_eq!(p.id(), "p1");
    }

    #[test]
    fn test_deserialize_rejects_blank_question() {
        let err = serde_json::from_str::<Problem>(r#"{"id":"x","question":"  "}"#).unwrap_err();
        assert!(err.to_string().contains("blank question"));
    }
}
