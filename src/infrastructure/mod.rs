//! Infrastructure layer with external service adapters.

/// Application configuration and settings persistence.
pub mod config;
/// Discord API client.
pub mod discord;
/// Image retrieval over HTTP.
pub mod image;
/// Desktop link opening.
pub mod link_opener;

pub use config::{AppConfig, CliArgs, LoadedSettings, LogLevel, SettingsStore};
pub use discord::DiscordClient;
pub use image::HttpImageFetcher;
pub use link_opener::{DisabledLinkOpener, SystemLinkOpener};
