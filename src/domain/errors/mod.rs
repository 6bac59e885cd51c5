//! Domain error types.

mod config_error;
mod discord_error;
mod download_error;

pub use config_error::ConfigError;
pub use discord_error::DiscordError;
pub use download_error::DownloadError;
