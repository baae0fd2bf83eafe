//! Infrastructure layer for agent-tribunal
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration, prompt and problem loading.

pub mod backend;
pub mod config;
pub mod logging;
pub mod prompts;
pub mod storage;

// Re-export commonly used types
pub use backend::{OpenAiBackend, OpenAiSetupError};
pub use config::{
    ConfigLoader, FileBackendConfig, FileConfig, FileOutputConfig, FilePathsConfig,
    FilePipelineConfig,
};
pub use logging::JsonlAuditLogger;
pub use prompts::{PromptLoadError, PromptLoader};
pub use storage::{JsonResultStore, ProblemLoadError, load_problems};
