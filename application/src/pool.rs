//! Bounded worker pool with an explicit join barrier.
//!
//! All tasks are spawned up front into a [`JoinSet`]; a shared [`Semaphore`]
//! caps how many run at once. [`WorkerPool::run_all`] returns only after every
//! task has finished, so no work is ever left detached.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Raised when a task panicked or was cancelled by the runtime
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Worker task failed: {0}")]
pub struct WorkerFailed(pub String);

/// Fixed-size pool for independent async tasks
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool running at most `size` tasks at a time (at least 1).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run every task and wait for all of them.
    ///
    /// Results come back in submission order. `on_complete` is called from
    /// the joining task as each one finishes, in completion order.
    pub async fn run_all<T, Fut>(
        &self,
        tasks: Vec<Fut>,
        mut on_complete: impl FnMut(usize, &T),
    ) -> Result<Vec<T>, WorkerFailed>
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slots: Vec<Option<T>> = (0..tasks.len()).map(|_| None).collect();
        let mut join_set = JoinSet::new();

        for (index, task) in tasks.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            join_set.spawn(async move {
                // The semaphore is never closed; a missing permit only means no limit.
                let _permit = permits.acquire_owned().await.ok();
                (index, task.await)
            });
        }

        let mut failure = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, output)) => {
                    on_complete(index, &output);
                    slots[index] = Some(output);
                }
                Err(e) => {
                    warn!(error = %e, "Worker task failed");
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if let Some(message) = failure {
            return Err(WorkerFailed(message));
        }
        Ok(slots.into_iter().flatten().collect())
    }
}
