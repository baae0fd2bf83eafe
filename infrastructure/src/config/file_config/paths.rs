//! File locations from TOML (`[paths]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where inputs are read from and results are written to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// Problem set (JSON array of `{id?, question}`)
    pub problems: Option<PathBuf>,
    /// Directory with prompt overrides; built-in prompts when unset
    pub prompts_dir: Option<PathBuf>,
    /// Directory for per-stage result files; nothing is written when unset
    pub results_dir: Option<PathBuf>,
    /// JSONL audit trail of every backend call; disabled when unset
    pub audit_log: Option<PathBuf>,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            problems: None,
            prompts_dir: None,
            results_dir: Some(PathBuf::from("results")),
            audit_log: None,
        }
    }
}
