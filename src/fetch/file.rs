// src/fetch/file.rs
// =============================================================================
// Reads documents from the local filesystem.
//
// Handy for crawling a checked-out copy of the docs (`doc/api/*.json` from a
// Node.js build) without touching the network. Accepts plain paths and
// file:// URLs.
// =============================================================================

use super::Fetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, address: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        let path = to_path(address)?;
        let read = tokio::fs::read_to_string(&path);

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| FetchError::Timeout {
                    address: address.to_string(),
                })?,
            None => read.await,
        };

        result.map_err(|e| FetchError::Transport {
            address: address.to_string(),
            message: e.to_string(),
        })
    }
}

fn to_path(address: &str) -> Result<PathBuf, FetchError> {
    if !address.starts_with("file:") {
        return Ok(PathBuf::from(address));
    }

    Url::parse(address)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| FetchError::Transport {
            address: address.to_string(),
            message: "not a valid file URL".to_string(),
        })
}
