//! Use case implementations.

mod download_image_use_case;
mod scan_channels_use_case;

pub use download_image_use_case::DownloadImageUseCase;
pub use scan_channels_use_case::{ScanChannelsUseCase, ScanError};
