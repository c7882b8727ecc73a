// src/error.rs
// =============================================================================
// Error types for every stage of the crawl.
//
// Each stage gets its own enum so callers can tell which step went wrong:
// - FetchError: one retrieval failed (timeout, transport, bad HTTP status)
// - TransformError: one fetched document could not be turned into a record
// - TaskError: either of the above, as reported for one task
// - ConfigError: the pipeline was configured with invalid options
// - IndexError: the root document did not list any usable modules
// - PipelineError: the whole run failed
//
// The binary wraps these in anyhow; the library keeps them typed.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// One retrieval failed. Always carries the address that was requested.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// The request did not finish within the per-task timeout
    #[error("timed out fetching {address}")]
    Timeout { address: String },

    /// Connection, DNS, TLS or filesystem failure
    #[error("failed to fetch {address}: {message}")]
    Transport { address: String, message: String },

    /// The server answered with a non-2xx status
    #[error("failed to fetch {address}: HTTP {status}")]
    BadStatus { address: String, status: u16 },
}

impl FetchError {
    /// The address the failed fetch was for
    pub fn address(&self) -> &str {
        match self {
            FetchError::Timeout { address }
            | FetchError::Transport { address, .. }
            | FetchError::BadStatus { address, .. } => address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformError {
    /// The payload is not a JSON document at all
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    /// No stability rule matched; recovered into `Stability::Unknown`
    #[error("no recognized stability field")]
    UnrecognizedSchema,
}

/// Why a single task failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "stage", content = "error", rename_all = "snake_case")]
pub enum TaskError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Concurrency must be at least 1
    #[error("concurrency must be at least 1")]
    NonPositiveConcurrency,

    /// An override was not written as NAME=LEVEL
    #[error("invalid override '{0}': expected NAME=LEVEL (e.g. fs=2)")]
    InvalidOverride(String),

    /// The config file could not be read or parsed
    #[error("failed to load config {path}: {message}")]
    Read { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The root document is not JSON
    #[error("index is not valid JSON: {0}")]
    NotJson(String),

    /// JSON, but neither a docs index nor a list of addresses
    #[error("index has no 'desc' section and is not a list of addresses")]
    UnsupportedShape,

    /// A listed address could not be resolved against the root
    #[error("cannot resolve '{0}' against the index address")]
    BadAddress(String),
}

/// A whole pipeline run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("failed to fetch the index: {0}")]
    RootFetchFailed(FetchError),

    #[error("failed to read the index: {0}")]
    InvalidIndex(#[from] IndexError),

    /// Fail-fast mode stopped at the first failing task
    #[error("task {index} ({address}) failed: {cause}")]
    BatchFailed {
        index: usize,
        address: String,
        cause: TaskError,
    },
}
