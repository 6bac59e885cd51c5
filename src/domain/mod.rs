//! Domain layer with core entities, snowflake math and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// Snowflake timestamp conversion.
pub mod snowflake;

pub use entities::{AuthToken, Message, Settings, User};
pub use errors::{ConfigError, DiscordError, DownloadError};
pub use ports::{ChatSessionPort, ImageFetchPort, LinkOpenerPort, SettingsPort};
