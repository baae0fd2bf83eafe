//! Structured generation on top of an untrusted backend

pub mod client;
pub mod retry;

pub use client::{CallSite, GenerationClient, GenerationError, GenerationResult};
pub use retry::{Backoff, RetryPolicy};
