//! imgharvest - downloads new images posted in configured Discord channels.
//!
//! Each run logs in as a bot, walks the configured servers and channels,
//! downloads every image posted since the channel's stored cursor, and writes
//! the advanced cursors back to the settings file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "imgharvest";
