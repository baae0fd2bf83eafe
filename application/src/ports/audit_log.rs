//! Port for the generation audit trail.
//!
//! Every backend invocation is recorded as a sequence of [`AuditEvent`]s
//! (request, failed attempts, response, fallback). This is separate from
//! `tracing`: tracing carries human-readable diagnostics, the audit trail
//! carries the full prompts and responses in a machine-readable form.

use serde_json::Value;

/// Kind of audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    GenerationRequest,
    GenerationAttemptFailed,
    GenerationResponse,
    GenerationFallback,
    StageStarted,
    StageCompleted,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::GenerationRequest => "generation_request",
            AuditEventKind::GenerationAttemptFailed => "generation_attempt_failed",
            AuditEventKind::GenerationResponse => "generation_response",
            AuditEventKind::GenerationFallback => "generation_fallback",
            AuditEventKind::StageStarted => "stage_started",
            AuditEventKind::StageCompleted => "stage_completed",
        }
    }
}

/// One audit record: a kind plus an event-specific JSON payload.
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(kind: AuditEventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for audit events.
///
/// `record` is synchronous and infallible on purpose: a broken audit sink
/// must never change the outcome of a generation call.
pub trait AuditLogger: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Discards every event.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn record(&self, _event: AuditEvent) {}
}
