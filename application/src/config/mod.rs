//! Application-level configuration.
//!
//! - [`PipelineConfig`]: solver arity, review pool size, retry policy, prompts

pub mod pipeline_config;

pub use pipeline_config::PipelineConfig;
