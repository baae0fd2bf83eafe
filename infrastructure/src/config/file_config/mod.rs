//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod output;
mod paths;
mod pipeline;

pub use backend::FileBackendConfig;
pub use output::FileOutputConfig;
pub use paths::FilePathsConfig;
pub use pipeline::FilePipelineConfig;

use serde::{Deserialize, Serialize};
use tribunal_application::PipelineConfig;
use tribunal_domain::{ConfigIssue, PromptSet};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generation backend settings
    pub backend: FileBackendConfig,
    /// Pipeline arity, concurrency and retry settings
    pub pipeline: FilePipelineConfig,
    /// Input and output locations
    pub paths: FilePathsConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors mean the configuration cannot work; warnings describe values
    /// that were replaced by a default.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.backend.validate());
        issues.extend(self.pipeline.validate());
        issues
    }

    /// Build the application pipeline configuration with the given prompts.
    pub fn to_pipeline_config(&self, prompts: PromptSet) -> PipelineConfig {
        PipelineConfig::default()
            .with_solver_count(self.pipeline.solver_count)
            .with_review_concurrency(self.pipeline.review_concurrency)
            .with_retry(self.pipeline.to_retry_policy().0)
            .with_prompts(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tribunal_application::Backoff;
    use tribunal_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[backend]
base_url = "http://localhost:8080/v1"
model = "llama-3"
temperature = 0.1

[backend.agent_models]
judge = "llama-3-70b"

[pipeline]
solver_count = 4
review_concurrency = 6
backoff = "none"

[paths]
problems = "data/problems.json"
audit_log = "logs/audit.jsonl"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.model, "llama-3");
        assert_eq!(
            config.backend.agent_models.get("judge").map(String::as_str),
            Some("llama-3-70b")
        );
        assert_eq!(config.pipeline.solver_count, 4);
        assert_eq!(
            config.paths.problems,
            Some(PathBuf::from("data/problems.json"))
        );
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());

        let pipeline = config.to_pipeline_config(PromptSet::default());
        assert_eq!(pipeline.solver_count, 4);
        assert_eq!(pipeline.review_concurrency, 6);
        assert_eq!(pipeline.retry.backoff, Backoff::None);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[pipeline]
max_attempts = 5
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pipeline.max_attempts, 5);
        // Defaults should apply
        assert_eq!(config.pipeline.solver_count, 3);
        assert_eq!(config.backend.model, "gpt-4");
        assert_eq!(config.paths.results_dir, Some(PathBuf::from("results")));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = FileConfig::default();
        config.backend.base_url.clear();
        config.pipeline.solver_count = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.is_error()));
    }
}
