//! Output format value object

use serde::{Deserialize, Serialize};

/// How batch results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage: solutions, reviews, refinements and the verdict
    Full,
    /// Only the verdict per problem (default)
    #[default]
    Verdict,
    /// Batch report as JSON
    Json,
}
