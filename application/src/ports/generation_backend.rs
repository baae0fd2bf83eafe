//! Generation backend port
//!
//! Defines the interface for sending one prompt to a text-generation backend.

use async_trait::async_trait;
use thiserror::Error;
use tribunal_domain::AgentId;

/// Transport-level failures of a backend call
///
/// A response that arrives but cannot be parsed is *not* a `BackendError`;
/// that is handled by the generation client's validation step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Timeout")]
    Timeout,

    #[error("Backend returned no content")]
    EmptyResponse,

    #[error("Other error: {0}")]
    Other(String),
}

/// A single completion request
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Agent on whose behalf the call is made; backends may route on it
    pub agent: AgentId,
    pub system_prompt: &'a str,
    pub user_payload: &'a str,
}

/// Backend for text generation
///
/// This port defines how the application layer talks to a model provider.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send a system instruction and user payload, returning the raw completion text
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, BackendError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
