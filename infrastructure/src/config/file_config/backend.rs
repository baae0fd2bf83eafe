//! Backend configuration from TOML (`[backend]` section)
//!
//! ```toml
//! [backend]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4"
//! api_key_env = "OPENAI_API_KEY"
//! temperature = 0.3
//!
//! [backend.agent_models]
//! judge = "gpt-4o"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_domain::{ConfigIssue, ConfigIssueCode};

/// OpenAI-compatible chat completions backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model used by every agent without an override.
    pub model: String,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer api_key_env).
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout; a timeout counts as a transport failure.
    pub request_timeout_secs: u64,
    /// Per-agent model overrides, keyed by agent id (`solver_2`, `judge`).
    pub agent_models: BTreeMap<String, String>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            temperature: 0.3,
            request_timeout_secs: 120,
            agent_models: BTreeMap::new(),
        }
    }
}

impl FileBackendConfig {
    /// Resolve the API key: explicit value first, then the named env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [("backend.base_url", &self.base_url), ("backend.model", &self.model)] {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: field.to_string(),
                    },
                    format!("{}: must not be empty", field),
                ));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "backend.temperature".to_string(),
                    value: self.temperature.to_string(),
                },
                format!(
                    "backend.temperature: {} is outside 0.0..=2.0",
                    self.temperature
                ),
            ));
        }

        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "backend.request_timeout_secs".to_string(),
                    value: "0".to_string(),
                },
                "backend.request_timeout_secs: must be at least 1",
            ));
        }

        for (agent, model) in &self.agent_models {
            if agent.parse::<tribunal_domain::AgentId>().is_err() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "backend.agent_models".to_string(),
                        value: agent.clone(),
                        valid_values: vec!["solver_<n>".to_string(), "judge".to_string()],
                    },
                    format!("backend.agent_models: unknown agent '{}', ignored", agent),
                ));
            } else if model.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: format!("backend.agent_models.{}", agent),
                    },
                    format!("backend.agent_models.{}: must not be empty", agent),
                ));
            }
        }

        issues
    }
}
