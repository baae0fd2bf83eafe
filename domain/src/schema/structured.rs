//! Typed structured outputs.
//!
//! [`StructuredOutput`] ties a record type to its schema, and
//! [`parse_structured`] is the single pure conversion
//! `text -> Result<T, ValidationError>` used at the backend boundary.

use super::documents::{judgment_schema, review_schema, solution_draft_schema};
use super::validation::{ValidationError, check_unit_interval, parse_json, validate};
use crate::pipeline::value_objects::{JudgmentDraft, ReviewDraft, SolutionDraft};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A record the backend can be asked to produce
pub trait StructuredOutput: Sized + Send + 'static {
    /// Schema the raw JSON must satisfy, if any
    fn schema() -> Option<&'static Value>;

    /// Convert schema-valid JSON into the record
    fn from_value(value: Value) -> Result<Self, ValidationError>;
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::Decode(e.to_string()))
}

impl StructuredOutput for SolutionDraft {
    fn schema() -> Option<&'static Value> {
        Some(solution_draft_schema())
    }

    fn from_value(value: Value) -> Result<Self, ValidationError> {
        let draft: SolutionDraft = decode(value)?;
        check_unit_interval("confidence", draft.confidence)?;
        Ok(draft)
    }
}

impl StructuredOutput for ReviewDraft {
    fn schema() -> Option<&'static Value> {
        Some(review_schema())
    }

    fn from_value(value: Value) -> Result<Self, ValidationError> {
        decode(value)
    }
}

impl StructuredOutput for JudgmentDraft {
    fn schema() -> Option<&'static Value> {
        Some(judgment_schema())
    }

    fn from_value(value: Value) -> Result<Self, ValidationError> {
        let draft: JudgmentDraft = decode(value)?;
        check_unit_interval("confidence", draft.confidence)?;
        Ok(draft)
    }
}

/// Any JSON document; used where only best-effort parsing is wanted.
impl StructuredOutput for Value {
    fn schema() -> Option<&'static Value> {
        None
    }

    fn from_value(value: Value) -> Result<Self, ValidationError> {
        Ok(value)
    }
}

/// Parse, validate and decode a raw backend response.
pub fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T, ValidationError> {
    let value = parse_json(text)?;
    if let Some(schema) = T::schema() {
        validate(&value, schema)?;
    }
    T::from_value(value)
}
