//! JSON file result store.
//!
//! Layout under the results directory:
//!
//! ```text
//! {problem_id}_roles.json
//! {problem_id}_raw_solutions.json
//! {problem_id}_peer_reviews.json
//! {problem_id}_refined_solutions.json
//! {problem_id}_final_judgment.json
//! all_judgments.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tribunal_application::ports::result_store::{ResultStore, StageRecord, StoreError};
use tribunal_domain::ProblemJudgment;

const ALL_JUDGMENTS_FILE: &str = "all_judgments.json";

/// Writes pretty-printed JSON files into one directory
pub struct JsonResultStore {
    dir: PathBuf,
}

impl JsonResultStore {
    /// Create the store, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one stage file
    pub fn stage_path(&self, problem_id: &str, record_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", file_stem(problem_id), record_name))
    }

    pub fn all_judgments_path(&self) -> PathBuf {
        self.dir.join(ALL_JUDGMENTS_FILE)
    }

    fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(value)?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "Saved");
        Ok(())
    }
}

/// Keep problem ids from escaping the results directory.
///
/// Distinct ids can share a stem (`a/b` and `a_b`); the problem loader
/// rejects such sets.
pub(super) fn file_stem(problem_id: &str) -> String {
    problem_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "_")
}

impl ResultStore for JsonResultStore {
    fn save_stage(&self, problem_id: &str, record: StageRecord<'_>) -> Result<(), StoreError> {
        let path = self.stage_path(problem_id, record.name());
        Self::write_json(&path, &record.to_json()?)
    }

    fn save_all_judgments(&self, judgments: &[ProblemJudgment]) -> Result<(), StoreError> {
        Self::write_json(&self.all_judgments_path(), &serde_json::to_value(judgments)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tribunal_domain::{AgentId, Judgment, Review, Solution};

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_stage_files_are_keyed_by_problem() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::create(dir.path().join("results")).unwrap();
        let solutions: Vec<_> = AgentId::solvers(2).into_iter().map(Solution::empty).collect();
        let reviews = vec![Review::neutral(AgentId::Solver(1), AgentId::Solver(2))];

        store
            .save_stage("p1", StageRecord::RawSolutions(&solutions))
            .unwrap();
        store
            .save_stage("p1", StageRecord::PeerReviews(&reviews))
            .unwrap();

        let raw = read(&dir.path().join("results/p1_raw_solutions.json"));
        assert_eq!(raw.as_array().unwrap().len(), 2);
        assert_eq!(raw[0]["solver_id"], "solver_1");

        let saved = read(&dir.path().join("results/p1_peer_reviews.json"));
        assert_eq!(saved[0]["reviewer_id"], "solver_1");
        assert_eq!(saved[0]["evaluation"]["scores"]["clarity"], 0.5);
    }

    #[test]
    fn test_all_judgments_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::create(dir.path()).unwrap();
        let judgments = vec![ProblemJudgment {
            problem_id: "p1".to_string(),
            judgment: Judgment {
                winner: AgentId::Solver(2),
                confidence: 0.9,
                reasoning: "complete".to_string(),
            },
        }];

        store.save_all_judgments(&judgments).unwrap();

        let all = read(&store.all_judgments_path());
        assert_eq!(all[0]["problem_id"], "p1");
        assert_eq!(all[0]["judgment"]["winner"], "solver_2");
    }

    #[test]
    fn test_problem_id_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::create(dir.path()).unwrap();

        let path = store.stage_path("../etc/passwd", "roles");
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonResultStore::create(dir.path().join("results")).unwrap();
        fs::remove_dir(store.dir()).unwrap();

        let judgment = Judgment {
            winner: AgentId::Solver(1),
            confidence: 0.7,
            reasoning: String::new(),
        };
        assert!(matches!(
            store.save_stage("p1", StageRecord::FinalJudgment(&judgment)),
            Err(StoreError::Io(_))
        ));
    }
}
