// src/fetch/http.rs
// =============================================================================
// Fetches documents over HTTP(S).
//
// Key functionality:
// - One reqwest Client for the whole run (it pools connections, and cloning
//   it is just a reference count bump)
// - Plain GET, body returned as text
// - Non-2xx answers become BadStatus, timeouts become Timeout, everything
//   else (DNS, TLS, refused connections, broken bodies) becomes Transport
// =============================================================================

use super::Fetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("stability-crawler/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        // Only follow a handful of redirects; the docs site needs at most one
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Uses a caller-configured client (proxies, custom TLS, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        let mut request = self.client.get(address);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| categorize_error(address, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        // The body can still time out or break halfway through
        response.text().await.map_err(|e| categorize_error(address, e))
    }
}

// Sorts reqwest errors into our three failure kinds
fn categorize_error(address: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout {
            address: address.to_string(),
        };
    }

    let message = if error.is_redirect() {
        "too many redirects".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        address: address.to_string(),
        message,
    }
}
