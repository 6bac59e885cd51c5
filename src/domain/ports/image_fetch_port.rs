//! Image fetch port.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::DownloadError;

/// Raw HTTP response for an image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Response status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl FetchedImage {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Port for fetching bytes over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Issues a GET for `url`. Non-200 statuses are returned, not raised.
    async fn fetch(&self, url: &str) -> Result<FetchedImage, DownloadError>;
}
