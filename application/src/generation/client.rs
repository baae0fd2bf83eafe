//! Generation client: the single gateway between stages and the backend.
//!
//! Owns the two halves of the backend contract:
//!
//! - transport failures are retried according to a [`RetryPolicy`] and become
//!   fatal ([`GenerationError::TransportExhausted`]) only when the budget runs out;
//! - malformed or schema-violating responses become
//!   [`GenerationResult::Fallback`] and are never retried.
//!
//! Raw backend text never leaves this module.

use super::retry::RetryPolicy;
use crate::ports::audit_log::{AuditEvent, AuditEventKind, AuditLogger, NoAuditLogger};
use crate::ports::generation_backend::{BackendError, CompletionRequest, GenerationBackend};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use tribunal_domain::util::preview;
use tribunal_domain::{AgentId, Stage, StructuredOutput, ValidationError, parse_structured};

/// Fatal generation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Backend unavailable after {attempts} attempts: {last_error}")]
    TransportExhausted {
        attempts: u32,
        last_error: BackendError,
    },
}

/// Outcome of a generation call that reached the backend
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult<T> {
    /// The response was valid and decoded
    Parsed(T),
    /// The response could not be trusted
    Fallback(ValidationError),
}

impl<T> GenerationResult<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationResult::Fallback(_))
    }

    /// Map the parsed value, keeping fallbacks as they are
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerationResult<U> {
        match self {
            GenerationResult::Parsed(value) => GenerationResult::Parsed(f(value)),
            GenerationResult::Fallback(reason) => GenerationResult::Fallback(reason),
        }
    }

    /// Take the parsed value or build the fallback; also report whether it fell back
    pub fn resolve(self, fallback: impl FnOnce() -> T) -> (T, bool) {
        match self {
            GenerationResult::Parsed(value) => (value, false),
            GenerationResult::Fallback(_) => (fallback(), true),
        }
    }
}

/// Where a generation call comes from, for logs and the audit trail
#[derive(Debug, Clone)]
pub struct CallSite {
    pub problem_id: String,
    pub stage: Stage,
    pub agent: AgentId,
}

impl CallSite {
    pub fn new(problem_id: impl Into<String>, stage: Stage, agent: AgentId) -> Self {
        Self {
            problem_id: problem_id.into(),
            stage,
            agent,
        }
    }

    fn audit_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("problem_id".to_string(), json!(self.problem_id));
        map.insert("stage".to_string(), json!(self.stage.as_str()));
        map.insert("agent".to_string(), json!(self.agent.to_string()));
        map
    }
}

/// Client for structured generation
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    retry: RetryPolicy,
    audit: Arc<dyn AuditLogger>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, retry: RetryPolicy) -> Self {
        Self {
            backend,
            retry,
            audit: Arc::new(NoAuditLogger),
        }
    }

    /// Create with an audit logger.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Invoke the backend with the client's retry policy.
    pub async fn invoke<T: StructuredOutput>(
        &self,
        site: &CallSite,
        system_prompt: &str,
        user_payload: &str,
    ) -> Result<GenerationResult<T>, GenerationError> {
        self.invoke_with_policy(site, system_prompt, user_payload, &self.retry)
            .await
    }

    /// Invoke the backend with an explicit retry budget.
    pub async fn invoke_with_policy<T: StructuredOutput>(
        &self,
        site: &CallSite,
        system_prompt: &str,
        user_payload: &str,
        retry: &RetryPolicy,
    ) -> Result<GenerationResult<T>, GenerationError> {
        self.record(
            AuditEventKind::GenerationRequest,
            site,
            json!({
                "backend": self.backend.name(),
                "system_prompt": system_prompt,
                "user_payload": user_payload,
            }),
        );

        let text = self
            .complete_with_retry(site, system_prompt, user_payload, retry)
            .await?;

        self.record(
            AuditEventKind::GenerationResponse,
            site,
            json!({ "text": text }),
        );

        match parse_structured::<T>(&text) {
            Ok(value) => Ok(GenerationResult::Parsed(value)),
            Err(reason) => {
                warn!(
                    problem = %site.problem_id,
                    stage = site.stage.as_str(),
                    agent = %site.agent,
                    %reason,
                    response = %preview(&text, 120),
                    "Unusable backend output, falling back"
                );
                self.record(
                    AuditEventKind::GenerationFallback,
                    site,
                    json!({ "reason": reason.to_string() }),
                );
                Ok(GenerationResult::Fallback(reason))
            }
        }
    }

    async fn complete_with_retry(
        &self,
        site: &CallSite,
        system_prompt: &str,
        user_payload: &str,
        retry: &RetryPolicy,
    ) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            agent: site.agent,
            system_prompt,
            user_payload,
        };
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(
                problem = %site.problem_id,
                stage = site.stage.as_str(),
                agent = %site.agent,
                attempt = attempts,
                "Calling backend"
            );

            let last_error = match self.backend.complete(request).await {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            self.record(
                AuditEventKind::GenerationAttemptFailed,
                site,
                json!({ "attempt": attempts, "error": last_error.to_string() }),
            );

            if !retry.should_retry(attempts) {
                warn!(
                    problem = %site.problem_id,
                    agent = %site.agent,
                    attempts,
                    error = %last_error,
                    "Backend retries exhausted"
                );
                return Err(GenerationError::TransportExhausted {
                    attempts,
                    last_error,
                });
            }

            let delay = retry.delay_after(attempts);
            warn!(
                "[Attempt {}/{}] backend call for {} failed: {}; retrying in {:?}",
                attempts, retry.max_attempts, site.agent, last_error, delay
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn record(&self, kind: AuditEventKind, site: &CallSite, payload: serde_json::Value) {
        let mut fields = site.audit_fields();
        if let serde_json::Value::Object(extra) = payload {
            fields.extend(extra);
        }
        self.audit
            .record(AuditEvent::new(kind, serde_json::Value::Object(fields)));
    }
}
