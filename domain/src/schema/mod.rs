//! Output contracts for the generation backend.
//!
//! - [`documents`]: JSON Schema documents per record type
//! - [`validation`]: JSON parsing and schema checking
//! - [`structured`]: typed conversion of validated JSON

pub mod documents;
pub mod structured;
pub mod validation;
