//! Prompt overrides from disk

mod loader;

pub use loader::{PromptLoadError, PromptLoader};
