//! File-based inputs and outputs

mod json_store;
mod problems;

pub use json_store::JsonResultStore;
pub use problems::{ProblemLoadError, load_problems};
