//! Prompt templates for the tribunal stages

mod template;

pub use template::{PromptSet, PromptTemplate};
