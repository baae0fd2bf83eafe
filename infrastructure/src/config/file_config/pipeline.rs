//! Pipeline configuration from TOML (`[pipeline]` section)
//!
//! ```toml
//! [pipeline]
//! solver_count = 3
//! review_concurrency = 3
//! problem_concurrency = 1
//! max_attempts = 3
//! backoff = "exponential"   # or "none", "fixed"
//! backoff_initial_ms = 1000
//! backoff_max_ms = 8000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tribunal_application::{Backoff, RetryPolicy};
use tribunal_domain::{ConfigIssue, ConfigIssueCode};

const BACKOFF_KINDS: [&str; 3] = ["none", "fixed", "exponential"];

/// Raw pipeline configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePipelineConfig {
    /// Number of solver agents
    pub solver_count: usize,
    /// Worker pool size for peer review
    pub review_concurrency: usize,
    /// Problems run at once (1 = sequential)
    pub problem_concurrency: usize,
    /// Attempts per backend call, including the first
    pub max_attempts: u32,
    /// Delay schedule between attempts: "none", "fixed" or "exponential"
    pub backoff: String,
    /// Fixed delay, or first exponential delay
    pub backoff_initial_ms: u64,
    /// Cap for exponential delays
    pub backoff_max_ms: u64,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            solver_count: 3,
            review_concurrency: 3,
            problem_concurrency: 1,
            max_attempts: 3,
            backoff: "fixed".to_string(),
            backoff_initial_ms: 1000,
            backoff_max_ms: 8000,
        }
    }
}

impl FilePipelineConfig {
    /// Build the retry policy, returning any issues found.
    ///
    /// An unknown backoff kind falls back to a fixed delay.
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let initial = Duration::from_millis(self.backoff_initial_ms);

        let backoff = match self.backoff.to_lowercase().as_str() {
            "none" => Backoff::None,
            "fixed" => Backoff::Fixed { delay: initial },
            "exponential" => Backoff::Exponential {
                initial,
                max: Duration::from_millis(self.backoff_max_ms.max(self.backoff_initial_ms)),
            },
            other => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "pipeline.backoff".to_string(),
                        value: other.to_string(),
                        valid_values: BACKOFF_KINDS.iter().map(|s| s.to_string()).collect(),
                    },
                    format!(
                        "pipeline.backoff: unknown value '{}', falling back to 'fixed'",
                        other
                    ),
                ));
                Backoff::Fixed { delay: initial }
            }
        };

        (RetryPolicy::new(self.max_attempts, backoff), issues)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.to_retry_policy().1;

        let positive = [
            ("pipeline.solver_count", self.solver_count as u64),
            ("pipeline.review_concurrency", self.review_concurrency as u64),
            ("pipeline.problem_concurrency", self.problem_concurrency as u64),
            ("pipeline.max_attempts", u64::from(self.max_attempts)),
        ];
        for (field, value) in positive {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: field.to_string(),
                        value: value.to_string(),
                    },
                    format!("{}: must be at least 1", field),
                ));
            }
        }

        if self.backoff_max_ms < self.backoff_initial_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "pipeline.backoff_max_ms".to_string(),
                    value: self.backoff_max_ms.to_string(),
                },
                "pipeline.backoff_max_ms: lower than backoff_initial_ms, using backoff_initial_ms",
            ));
        }

        issues
    }
}
