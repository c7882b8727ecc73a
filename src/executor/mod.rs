// src/executor/mod.rs
// =============================================================================
// This module runs a batch of independent tasks with bounded concurrency.
//
// How it works:
// 1. The tasks become a stream of futures, one per task, in submission order
// 2. buffer_unordered(C) keeps at most C of them in flight; when one
//    finishes, the next pending task (FIFO) is started
// 3. Each result is written into its own pre-sized slot, indexed by the
//    task's position in the submission list
// 4. When every slot is filled the slots are returned in order
//
// Results come back in whatever order the network delivers them, but the
// output is always in submission order.
//
// Fail-fast mode stops at the first failure. Dropping the stream cancels
// the tasks that are still in flight, and pending tasks are never started.
// =============================================================================

mod observer;

pub use observer::{ExecutionObserver, NoopObserver, TracingObserver};

use crate::error::{ConfigError, TaskError};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// One unit of work: a module to fetch and its place in the request list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Position in the original request list
    pub index: usize,
    /// Module name, used as the record name after transformation
    pub name: String,
    /// Where to fetch the module document from
    pub address: String,
}

/// The outcome of one Task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult<V> {
    pub index: usize,
    pub address: String,
    pub outcome: Result<V, TaskError>,
}

impl<V> TaskResult<V> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// The first failure seen by a fail-fast batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub address: String,
    pub cause: TaskError,
}

/// Runs tasks with at most `concurrency` of them in flight at once.
#[derive(Clone)]
pub struct BoundedExecutor {
    concurrency: usize,
    fail_fast: bool,
    observer: Arc<dyn ExecutionObserver>,
}

impl std::fmt::Debug for BoundedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedExecutor")
            .field("concurrency", &self.concurrency)
            .field("fail_fast", &self.fail_fast)
            .finish_non_exhaustive()
    }
}

impl BoundedExecutor {
    /// Creates an executor that runs every task to completion.
    ///
    /// Fails with `NonPositiveConcurrency` when `concurrency` is 0.
    pub fn new(concurrency: usize) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::NonPositiveConcurrency);
        }
        Ok(Self {
            concurrency,
            fail_fast: false,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Stop at the first failing task instead of collecting every outcome.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs `op` once per task and returns one result per task, in the
    /// order the tasks were given.
    ///
    /// In fail-fast mode the first failing task ends the batch with a
    /// `BatchFailure`; otherwise failures are reported in their slot and
    /// this never returns `Err`.
    pub async fn run<V, F, Fut>(
        &self,
        tasks: Vec<Task>,
        op: F,
    ) -> Result<Vec<TaskResult<V>>, BatchFailure>
    where
        F: Fn(Task) -> Fut,
        Fut: Future<Output = Result<V, TaskError>>,
    {
        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        // More slots than tasks buys nothing
        let width = self.concurrency.min(total);
        let started = Instant::now();
        let observer = self.observer.as_ref();
        let op = &op;

        observer.on_batch_started(total, width, self.fail_fast);

        let mut in_flight = stream::iter(tasks.into_iter().enumerate())
            .map(|(slot, task)| async move {
                observer.on_dispatch(&task);
                let began = Instant::now();
                let outcome = op(task.clone()).await;
                observer.on_complete(&task, outcome.as_ref().err(), began.elapsed());
                (slot, task, outcome)
            })
            .buffer_unordered(width);

        let mut slots: Vec<Option<TaskResult<V>>> = (0..total).map(|_| None).collect();
        let mut filled = 0;
        let mut failed = 0;

        while let Some((slot, task, outcome)) = in_flight.next().await {
            if let Err(cause) = &outcome {
                failed += 1;
                if self.fail_fast {
                    observer.on_batch_finished(filled, failed, started.elapsed());
                    return Err(BatchFailure {
                        index: task.index,
                        address: task.address,
                        cause: cause.clone(),
                    });
                }
            }

            debug_assert!(slots[slot].is_none(), "slot {} written twice", slot);
            slots[slot] = Some(TaskResult {
                index: task.index,
                address: task.address,
                outcome,
            });
            filled += 1;
        }

        debug_assert_eq!(filled, total);
        observer.on_batch_finished(filled, failed, started.elapsed());

        Ok(slots.into_iter().flatten().collect())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why buffer_unordered and not spawning a task per module?
//    - The futures only wait on the network, so one thread can drive them all
//    - buffer_unordered(N) polls at most N futures at a time and pulls the
//      next one from the stream only when a slot frees up
//    - Nothing is spawned, so dropping the stream really cancels everything
//
// 2. Why the Vec<Option<TaskResult>>?
//    - buffer_unordered yields results in completion order
//    - Each result carries its slot number, so we can put it back in place
//    - Every slot is written exactly once, by the completion that owns it
//
// 3. Why `let op = &op;` before the closure?
//    - Each future needs to call op, but only one copy of op exists
//    - A shared reference is Copy, so every `async move` block gets its own
// -----------------------------------------------------------------------------
