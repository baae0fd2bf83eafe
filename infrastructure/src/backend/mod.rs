//! Generation backend adapters

mod openai;

pub use openai::{OpenAiBackend, OpenAiSetupError};
