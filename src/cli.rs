// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: crawl a docs index and print the modules
// grouped by stability. All pipeline options can come from a JSON config
// file; flags given here win over the file.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

/// Where the latest Node.js release publishes its API docs index
pub const DEFAULT_ROOT: &str = "https://nodejs.org/dist/latest/docs/api/index.json";

#[derive(Parser, Debug)]
#[command(
    name = "stability-crawler",
    version,
    about = "Group the Node.js API modules by stability level",
    long_about = "stability-crawler fetches the Node.js API docs index, downloads every module's \
                  JSON documentation concurrently, and prints the modules grouped by their \
                  stability index as JSON."
)]
pub struct Cli {
    /// Docs index to start from (URL, file:// URL or local path)
    #[arg(default_value = DEFAULT_ROOT)]
    pub root: String,

    /// Maximum number of module documents fetched at once [default: 36]
    #[arg(long, short = 'c')]
    pub concurrency: Option<usize>,

    /// Stop at the first module that fails instead of reporting it
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-document timeout in milliseconds (no timeout by default)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Force a module's stability, e.g. --override repl=2 (repeatable)
    #[arg(long = "override", value_name = "NAME=LEVEL")]
    pub overrides: Vec<String>,

    /// JSON config file with any of: concurrency, fail_fast, timeout_ms, overrides
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the full report (groups and failures) instead of just the groups
    #[arg(long)]
    pub report: bool,
}
