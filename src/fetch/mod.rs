// src/fetch/mod.rs
// =============================================================================
// This module retrieves documents.
//
// The pipeline only knows about the Fetcher trait: give it an address, get
// back the document text or a FetchError. That keeps the network out of the
// core logic and lets tests plug in stub fetchers.
//
// Submodules:
// - http: fetches http:// and https:// addresses with reqwest
// - file: reads local paths and file:// URLs with tokio::fs
//
// DefaultFetcher picks between the two based on the address.
// =============================================================================

mod file;
mod http;

pub use file::FileFetcher;
pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Retrieves one document.
///
/// Implementations must not block: several fetches run concurrently on the
/// same runtime. A failure only concerns the address it was for.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str, timeout: Option<Duration>) -> Result<String, FetchError>;
}

/// Sends web addresses to HttpFetcher and everything else to FileFetcher.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl DefaultFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpFetcher::new()?,
            file: FileFetcher,
        })
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    async fn fetch(&self, address: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        if is_web_address(address) {
            self.http.fetch(address, timeout).await
        } else {
            self.file.fetch(address, timeout).await
        }
    }
}

pub(crate) fn is_web_address(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}
