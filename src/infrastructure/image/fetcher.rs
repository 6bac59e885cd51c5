//! HTTP image fetcher.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::DownloadError;
use crate::domain::ports::{FetchedImage, ImageFetchPort};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Plain GET fetcher over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with the default request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a fetcher with a custom request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DownloadError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DownloadError::network("", format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, DownloadError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            warn!(error = %e, url, "Image request failed");
            DownloadError::network(url, format!("request failed: {e}"))
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, format!("failed to read body: {e}")))?;

        debug!(url, status, bytes = body.len(), "Fetched image");
        Ok(FetchedImage::new(status, body))
    }
}
