//! Image download error types.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal image download failures. A 404 is not an error; see `DownloadOutcome`.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server answered with a status other than 200 or 404.
    #[error("HTTP {status} error ({url}): {body}")]
    UnexpectedStatus {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// Response body, lossily decoded.
        body: String,
    },

    /// Request could not be completed.
    #[error("request for {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// Image could not be written to disk.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates network error.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }
}
