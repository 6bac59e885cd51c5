//! Scan result DTOs.

use std::path::PathBuf;

/// Result of a single download attempt that did not abort the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Image fetched and written.
    Downloaded {
        /// Destination path.
        path: PathBuf,
        /// Bytes written.
        bytes: usize,
    },
    /// Destination already existed; nothing fetched.
    AlreadyPresent {
        /// Existing path.
        path: PathBuf,
    },
    /// Server answered 404; skipped.
    NotFound {
        /// Requested URL.
        url: String,
    },
}

/// Counters for one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Channels scanned, including ones that failed.
    pub channels_scanned: usize,
    /// Messages fully processed.
    pub messages_processed: usize,
    /// Images written to disk.
    pub downloaded: usize,
    /// Images skipped because the file existed.
    pub already_present: usize,
    /// Images that answered 404.
    pub not_found: usize,
    /// Links handed to the link opener.
    pub links_opened: usize,
}

impl ScanReport {
    /// Counts a download outcome.
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::AlreadyPresent { .. } => self.already_present += 1,
            DownloadOutcome::NotFound { .. } => self.not_found += 1,
        }
    }
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} channels, {} messages, {} downloaded, {} already present, {} not found, {} links opened",
            self.channels_scanned,
            self.messages_processed,
            self.downloaded,
            self.already_present,
            self.not_found,
            self.links_opened
        )
    }
}
