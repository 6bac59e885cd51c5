//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Stateless message and URL services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{DownloadOutcome, ScanReport};
pub use use_cases::{DownloadImageUseCase, ScanChannelsUseCase, ScanError};
