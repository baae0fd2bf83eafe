//! Problem set loading.
//!
//! The input is a JSON array of `{"id"?: string, "question": string}`. A
//! missing id becomes `problem_<n>` (1-based position in the file).

use super::json_store::file_stem;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tribunal_domain::Problem;

/// Failure to load a problem set
#[derive(Error, Debug)]
pub enum ProblemLoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid problem file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Problem #{index} ({id}) has an empty question")]
    EmptyQuestion { index: usize, id: String },

    #[error("Duplicate problem id '{0}'")]
    DuplicateId(String),

    #[error("Problem ids '{first}' and '{second}' map to the same result file name")]
    ClashingIds { first: String, second: String },
}

#[derive(Deserialize)]
struct RawProblem {
    #[serde(default)]
    id: Option<String>,
    question: String,
}

/// Load and validate a problem file.
pub fn load_problems(path: &Path) -> Result<Vec<Problem>, ProblemLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProblemLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<RawProblem> =
        serde_json::from_str(&text).map_err(|source| ProblemLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    into_problems(raw)
}

fn into_problems(raw: Vec<RawProblem>) -> Result<Vec<Problem>, ProblemLoadError> {
    // result file stem -> id that claimed it
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut problems = Vec::with_capacity(raw.len());

    for (i, entry) in raw.into_iter().enumerate() {
        let index = i + 1;
        let id = entry
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("problem_{}", index));

        let problem = Problem::try_new(id.clone(), entry.question)
            .ok_or(ProblemLoadError::EmptyQuestion { index, id })?;
        if let Some(first) = seen.insert(file_stem(problem.id()), problem.id().to_string()) {
            return Err(if first == problem.id() {
                ProblemLoadError::DuplicateId(first)
            } else {
                ProblemLoadError::ClashingIds {
                    first,
                    second: problem.id().to_string(),
                }
            });
        }
        problems.push(problem);
    }
    Ok(problems)
}
