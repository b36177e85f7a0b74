//! # Downloader
//!
//! Fetches saved documents, change archives and submitted form data from the
//! editing server.
//!
//! Every request carries the configured timeout. A transient failure
//! (connection error, timeout, 5xx answer) is retried once after
//! [`RETRY_DELAY`]; anything else fails immediately. The request future is
//! owned by the handler that started it, so a dropped HTTP request cancels
//! its downloads.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::DocumentError;

/// Pause before the single retry of a transient failure.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Body of a 2xx answer from `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DocumentError>;

    /// Body of a 2xx answer from `url`, decoded as text.
    async fn fetch_text(&self, url: &str) -> Result<String, DocumentError> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|e| DocumentError::fetch(url, e))
    }
}

/// [`Downloader`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

enum Attempt {
    Done(Vec<u8>),
    Transient(String),
    Fatal(String),
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<Self, DocumentError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocumentError::fetch("<client>", e))?;
        Ok(HttpDownloader { client })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => return Attempt::Transient(e.to_string()),
            Err(e) => return Attempt::Fatal(e.to_string()),
        };

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Transient(format!("server answered {}", status));
        }
        if !status.is_success() {
            return Attempt::Fatal(format!("server answered {}", status));
        }

        match response.bytes().await {
            Ok(body) => Attempt::Done(body.to_vec()),
            Err(e) if e.is_timeout() => Attempt::Transient(e.to_string()),
            Err(e) => Attempt::Fatal(e.to_string()),
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DocumentError> {
        match self.attempt(url).await {
            Attempt::Done(bytes) => return Ok(bytes),
            Attempt::Fatal(reason) => return Err(DocumentError::fetch(url, reason)),
            Attempt::Transient(reason) => {
                log::warn!("Download of {} failed ({}), retrying once", url, reason);
            }
        }

        tokio::time::sleep(RETRY_DELAY).await;
        match self.attempt(url).await {
            Attempt::Done(bytes) => Ok(bytes),
            Attempt::Transient(reason) | Attempt::Fatal(reason) => {
                Err(DocumentError::fetch(url, reason))
            }
        }
    }
}
