//! Prompt directory loader.
//!
//! A prompt directory may override any of the stage system prompts:
//!
//! | File                       | Stage                          |
//! |----------------------------|--------------------------------|
//! | `role_self_assessment.txt` | role assignment                |
//! | `solver.txt`               | solving and refinement         |
//! | `reviewer.txt`             | peer review                    |
//! | `judge.txt`                | judging                        |
//!
//! Missing files keep the built-in prompt.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use tribunal_domain::PromptSet;

pub const ROLE_ASSESSMENT_FILE: &str = "role_self_assessment.txt";
pub const SOLVER_FILE: &str = "solver.txt";
pub const REVIEWER_FILE: &str = "reviewer.txt";
pub const JUDGE_FILE: &str = "judge.txt";

/// Failure to read an existing prompt directory
#[derive(Error, Debug)]
pub enum PromptLoadError {
    #[error("Prompt directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Cannot read prompt {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Reads prompt overrides from a directory
pub struct PromptLoader;

impl PromptLoader {
    /// Load a prompt set, starting from the built-in prompts.
    pub fn load(dir: &Path) -> Result<PromptSet, PromptLoadError> {
        if !dir.is_dir() {
            return Err(PromptLoadError::MissingDirectory(dir.to_path_buf()));
        }

        let mut prompts = PromptSet::default();
        let slots: [(&str, &mut String); 4] = [
            (ROLE_ASSESSMENT_FILE, &mut prompts.role_assessment),
            (SOLVER_FILE, &mut prompts.solver),
            (REVIEWER_FILE, &mut prompts.reviewer),
            (JUDGE_FILE, &mut prompts.judge),
        ];

        for (file, slot) in slots {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(path = %path.display(), "Loaded prompt override");
                    *slot = text;
                }
                Ok(_) => warn!(path = %path.display(), "Prompt file is empty, using built-in"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "Prompt file missing, using built-in")
                }
                Err(source) => return Err(PromptLoadError::Io { path, source }),
            }
        }

        Ok(prompts)
    }
}
