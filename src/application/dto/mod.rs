//! Data transfer objects for the application layer.

mod scan_dto;

pub use scan_dto::{DownloadOutcome, ScanReport};
