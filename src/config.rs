// src/config.rs
// =============================================================================
// Options that control a pipeline run.
//
// Every field has a default, so a config file only needs the keys it wants
// to change:
//
//   { "concurrency": 8, "timeout_ms": 5000, "overrides": { "repl": 2 } }
//
// CLI flags are applied on top of whatever the file (or the defaults) say.
// =============================================================================

use crate::error::ConfigError;
use crate::transform::Stability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// How many module documents may be in flight at once by default.
///
/// Far below typical file-descriptor and connection limits.
pub const DEFAULT_CONCURRENCY: usize = 36;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Maximum number of tasks in flight
    pub concurrency: usize,

    /// Abort the batch at the first failing task
    pub fail_fast: bool,

    /// Per-fetch timeout in milliseconds; no timeout when absent
    pub timeout_ms: Option<u64>,

    /// Module name -> stability, checked before the document is looked at
    pub overrides: BTreeMap<String, Stability>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fail_fast: false,
            timeout_ms: None,
            overrides: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let read_error = |message: String| ConfigError::Read {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        let config: PipelineConfig =
            serde_json::from_str(&content).map_err(|e| read_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::NonPositiveConcurrency);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Adds an override written as `NAME=LEVEL` (e.g. `fs=2` or `repl=unknown`)
    pub fn add_override(&mut self, spec: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidOverride(spec.to_string());

        let (name, level) = spec.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let stability: Stability = level.parse().map_err(|_| invalid())?;

        self.overrides.insert(name.to_string(), stability);
        Ok(())
    }
}
