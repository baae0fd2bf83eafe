//! Application layer for agent-tribunal
//!
//! This crate contains the generation client, the pipeline stages, use cases,
//! port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod generation;
pub mod pool;
pub mod ports;
pub mod stages;
pub mod use_cases;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use generation::{
    Backoff, CallSite, GenerationClient, GenerationError, GenerationResult, RetryPolicy,
};
pub use pool::{WorkerFailed, WorkerPool};
pub use ports::{
    audit_log::{AuditEvent, AuditEventKind, AuditLogger, NoAuditLogger},
    generation_backend::{BackendError, CompletionRequest, GenerationBackend},
    progress::{NoProgress, ProgressNotifier},
    result_store::{NoResultStore, ResultStore, StageRecord, StoreError},
};
pub use stages::{StageError, StageOutput};
pub use use_cases::run_batch::{BatchReport, FailedProblem, RunBatchUseCase};
pub use use_cases::run_pipeline::{RunPipelineError, RunPipelineUseCase};
