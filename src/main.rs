// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr, so stdout stays pure JSON)
// 2. Parse command-line arguments and build the pipeline config
// 3. Run the crawl and print the grouped modules as JSON
// 4. Exit with proper code (0 = every module read, 1 = some failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use stability_crawler::{DefaultFetcher, Pipeline, PipelineConfig, TracingObserver};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every module document was read
//   Ok(1) = finished, but some modules failed
//   Err   = the run as a whole failed
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let fetcher = DefaultFetcher::new().context("failed to create HTTP client")?;
    let pipeline = Pipeline::new(Arc::new(fetcher), config)?
        .with_observer(Arc::new(TracingObserver));

    let report = pipeline
        .run(&cli.root)
        .await
        .with_context(|| format!("crawl of {} failed", cli.root))?;

    let output = if cli.report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&report.grouped)?
    };
    println!("{}", output);

    if report.is_complete() {
        Ok(0)
    } else {
        tracing::warn!("{} module(s) could not be classified", report.failures.len());
        Ok(1)
    }
}

// Config file first (if any), then flags on top
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if cli.fail_fast {
        config.fail_fast = true;
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }
    for spec in &cli.overrides {
        config.add_override(spec)?;
    }

    config.validate()?;
    Ok(config)
}
