//! Scan settings document: credentials, destination and per-channel cursors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthToken, ChannelId, GuildId};

/// Root of `settings.json`.
///
/// Keys this type does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Bot token.
    pub token: String,

    /// Folder images are written to.
    pub download_folder: PathBuf,

    /// Servers to scan, keyed by guild ID.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerSettings>,

    /// Open links without a downloadable image in the system browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_unmatched_links: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Channels to scan within one server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Channels keyed by channel ID.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scan progress for one channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Creation time of the last processed message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_parsed_message_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Creates settings with no servers configured.
    #[must_use]
    pub fn new(token: impl Into<String>, download_folder: impl Into<PathBuf>) -> Self {
        Self {
            token: token.into(),
            download_folder: download_folder.into(),
            servers: BTreeMap::new(),
            open_unmatched_links: None,
            extra: Map::new(),
        }
    }

    /// Adds a channel to scan, creating its server entry if needed.
    #[must_use]
    pub fn with_channel(mut self, guild_id: GuildId, channel_id: ChannelId) -> Self {
        self.servers
            .entry(guild_id.to_string())
            .or_default()
            .channels
            .entry(channel_id.to_string())
            .or_default();
        self
    }

    /// Returns the token if it has the shape of a Discord token.
    #[must_use]
    pub fn auth_token(&self) -> Option<AuthToken> {
        AuthToken::new(self.token.as_str())
    }

    #[must_use]
    pub fn opens_unmatched_links(&self) -> bool {
        self.open_unmatched_links.unwrap_or(true)
    }

    /// Returns the configuration of a server, if it is configured.
    #[must_use]
    pub fn server(&self, guild_id: GuildId) -> Option<&ServerSettings> {
        self.servers.get(&guild_id.to_string())
    }

    #[must_use]
    pub fn channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<&ChannelSettings> {
        self.server(guild_id)?.channels.get(&channel_id.to_string())
    }

    pub fn channel_mut(
        &mut self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Option<&mut ChannelSettings> {
        self.servers
            .get_mut(&guild_id.to_string())?
            .channels
            .get_mut(&channel_id.to_string())
    }
}
