// src/lib.rs
// =============================================================================
// stability-crawler: fetch the Node.js API docs, classify every module by
// its stability level, and group the results.
//
// Data flows one way:
//   root address -> index -> tasks -> bounded executor (fetch + transform)
//   -> ordered records -> aggregate -> grouped result
//
// Modules:
// - fetch: the Fetcher trait plus HTTP and filesystem implementations
// - index: turns the root document into module tasks
// - transform: module document -> ModuleRecord (name + stability)
// - executor: runs tasks with bounded concurrency, keeping submission order
// - aggregate: groups records by stability
// - pipeline: all of the above in one `run`
// - config / error: options and error types
// =============================================================================

pub mod aggregate;
pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod transform;

pub use aggregate::{aggregate, GroupedResult};
pub use config::{PipelineConfig, DEFAULT_CONCURRENCY};
pub use error::{ConfigError, FetchError, IndexError, PipelineError, TaskError, TransformError};
pub use executor::{
    BatchFailure, BoundedExecutor, ExecutionObserver, NoopObserver, Task, TaskResult,
    TracingObserver,
};
pub use fetch::{DefaultFetcher, FileFetcher, Fetcher, HttpFetcher};
pub use index::resolve_index;
pub use pipeline::{Pipeline, RunReport, TaskFailure};
pub use transform::{ModuleRecord, Stability, Transformer};
