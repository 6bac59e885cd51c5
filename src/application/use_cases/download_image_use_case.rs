//! Image download use case.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, error, info};

use crate::application::dto::DownloadOutcome;
use crate::domain::errors::DownloadError;
use crate::domain::ports::ImageFetchPort;

const STATUS_OK: u16 = 200;
const STATUS_NOT_FOUND: u16 = 404;

/// Fetches one image into the download folder unless it is already there.
#[derive(Clone)]
pub struct DownloadImageUseCase {
    fetch_port: Arc<dyn ImageFetchPort>,
}

impl DownloadImageUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(fetch_port: Arc<dyn ImageFetchPort>) -> Self {
        Self { fetch_port }
    }

    /// Downloads `url` to `folder/filename`.
    ///
    /// An existing destination is never re-fetched. A 404 is reported as
    /// [`DownloadOutcome::NotFound`].
    ///
    /// # Errors
    /// Returns error for any other non-200 status, transport failures and
    /// write failures.
    pub async fn execute(
        &self,
        url: &str,
        folder: &Path,
        filename: &str,
    ) -> Result<DownloadOutcome, DownloadError> {
        let path = folder.join(filename);

        if fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "Already downloaded");
            return Ok(DownloadOutcome::AlreadyPresent { path });
        }

        debug!(url, "Fetching image");
        let response = self.fetch_port.fetch(url).await?;

        match response.status {
            STATUS_OK => {
                fs::write(&path, &response.body)
                    .await
                    .map_err(|source| DownloadError::Io {
                        path: path.clone(),
                        source,
                    })?;
                info!(filename, bytes = response.body.len(), "Downloaded");
                Ok(DownloadOutcome::Downloaded {
                    path,
                    bytes: response.body.len(),
                })
            }
            STATUS_NOT_FOUND => {
                error!(url, "404 error when trying to download");
                Ok(DownloadOutcome::NotFound {
                    url: url.to_string(),
                })
            }
            status => Err(DownloadError::UnexpectedStatus {
                status,
                url: url.to_string(),
                body: String::from_utf8_lossy(&response.body).into_owned(),
            }),
        }
    }
}
