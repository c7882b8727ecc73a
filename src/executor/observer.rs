// src/executor/observer.rs
// =============================================================================
// Hooks for watching a batch run.
//
// The executor calls an ExecutionObserver when the batch starts, whenever a
// task is dispatched or finishes, and once when the batch is done. The
// executor itself does no logging. The observer is passed in
// explicitly, so tests can record what happened and the CLI can log it.
// =============================================================================

use super::Task;
use crate::error::TaskError;
use std::time::Duration;

/// Receives executor events. Every method defaults to doing nothing.
pub trait ExecutionObserver: Send + Sync {
    /// The batch is about to start with `width` concurrency slots
    fn on_batch_started(&self, _tasks: usize, _width: usize, _fail_fast: bool) {}

    /// A task took a concurrency slot and is about to start
    fn on_dispatch(&self, _task: &Task) {}

    /// A task finished; `error` is set when it failed
    fn on_complete(&self, _task: &Task, _error: Option<&TaskError>, _elapsed: Duration) {}

    /// The batch stopped, either because every task finished or because
    /// fail-fast mode hit a failure
    fn on_batch_finished(&self, _completed: usize, _failed: usize, _elapsed: Duration) {}
}

/// Observer that ignores everything. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Observer that reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ExecutionObserver for TracingObserver {
    fn on_batch_started(&self, tasks: usize, width: usize, fail_fast: bool) {
        tracing::info!(tasks, concurrency = width, fail_fast, "starting batch");
    }

    fn on_dispatch(&self, task: &Task) {
        tracing::debug!(index = task.index, address = %task.address, "fetching");
    }

    fn on_complete(&self, task: &Task, error: Option<&TaskError>, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match error {
            None => tracing::debug!(
                index = task.index,
                name = %task.name,
                elapsed_ms,
                "task finished"
            ),
            Some(error) => tracing::warn!(
                index = task.index,
                address = %task.address,
                elapsed_ms,
                %error,
                "task failed"
            ),
        }
    }

    fn on_batch_finished(&self, completed: usize, failed: usize, elapsed: Duration) {
        tracing::info!(
            completed,
            failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch finished"
        );
    }
}
