//! Deadline-bounded execution of upstream calls on a bounded worker pool.
//!
//! [`TimeoutExecutor`] spawns each operation as a tokio task that first
//! takes a permit from a shared semaphore, so at most `workers` upstream
//! calls run at once and further calls queue instead of failing. The caller
//! waits on the task's `JoinHandle` under [`tokio::time::timeout`].
//!
//! # Known limitation: no cancellation
//!
//! When the deadline elapses the caller gets [`PaddockError::Timeout`] and
//! the `JoinHandle` is dropped, which detaches the task rather than aborting
//! it. The upstream call keeps its worker permit and runs to completion; its
//! result is discarded. Upstream clients are not required to be
//! cancel-safe, so they are never dropped mid-request.
//!
//! The deadline is measured from submission and includes time spent queued
//! for a permit.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::warn;

use crate::telemetry;
use crate::{PaddockError, Result};

/// Default deadline for a single upstream call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Default number of upstream calls allowed to run concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Runs upstream operations with a wall-clock deadline.
///
/// Cheap to share: wrap in an `Arc` and hand the same executor to every
/// cache so they draw from one worker pool.
#[derive(Debug)]
pub struct TimeoutExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
    deadline: Duration,
}

impl TimeoutExecutor {
    /// Create an executor with `workers` slots and a default `deadline`.
    ///
    /// A zero-sized pool would queue every call forever, so `workers` is
    /// clamped to at least one.
    pub fn new(workers: usize, deadline: Duration) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            deadline,
        }
    }

    /// The deadline applied by [`run`](Self::run).
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Size of the worker pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of worker slots currently in use, including slots held by
    /// operations whose callers already timed out.
    pub fn busy_workers(&self) -> usize {
        self.workers - self.permits.available_permits()
    }

    /// Run `operation` with the executor's default deadline.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.run_with_deadline(operation, self.deadline).await
    }

    /// Run `operation`, giving up after `deadline`.
    ///
    /// Returns the operation's own result if it finishes in time,
    /// [`PaddockError::Timeout`] otherwise. A panic inside the operation is
    /// reported as [`PaddockError::Upstream`].
    pub async fn run_with_deadline<F, T>(&self, operation: F, deadline: Duration) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let submitted = Instant::now();

        let task = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| PaddockError::Upstream("worker pool closed".to_string()))?;
            let started = Instant::now();
            let result = operation.await;
            metrics::histogram!(telemetry::LOAD_DURATION_SECONDS)
                .record(started.elapsed().as_secs_f64());
            result
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PaddockError::Upstream(format!(
                "upstream task failed: {join_err}"
            ))),
            Err(_) => {
                metrics::counter!(telemetry::TIMEOUTS_TOTAL).increment(1);
                warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    waited_ms = submitted.elapsed().as_millis() as u64,
                    "upstream operation exceeded deadline; it keeps running detached"
                );
                Err(PaddockError::Timeout { after: deadline })
            }
        }
    }
}

impl Default for TimeoutExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, DEFAULT_DEADLINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_clamped() {
        let executor = TimeoutExecutor::new(0, DEFAULT_DEADLINE);
        assert_eq!(executor.workers(), 1);
    }

    #[test]
    fn defaults() {
        let executor = TimeoutExecutor::default();
        assert_eq!(executor.workers(), 4);
        assert_eq!(executor.deadline(), Duration::from_secs(30));
        assert_eq!(executor.busy_workers(), 0);
    }
}
