//! Discord REST payloads and their conversion into domain entities.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::entities::{Attachment, Channel, ChannelKind, Embed, Guild, Message, User};
use crate::domain::serde_utils::string_to_u64;
use crate::domain::snowflake;

/// Discord API user response structure.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    /// Discord user ID.
    #[serde(with = "string_to_u64")]
    pub id: u64,
    /// Discord username.
    pub username: String,
    /// User discriminator tag.
    #[serde(default)]
    pub discriminator: String,
    /// Whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl From<UserResponse> for User {
    fn from(user: UserResponse) -> Self {
        Self::new(user.id, user.username, user.discriminator, user.bot)
    }
}

/// Partial guild from `GET /users/@me/guilds`.
#[derive(Debug, Deserialize)]
pub struct GuildResponse {
    #[serde(with = "string_to_u64")]
    pub id: u64,
    pub name: String,
}

impl From<GuildResponse> for Guild {
    fn from(guild: GuildResponse) -> Self {
        Self::new(guild.id, guild.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelResponse {
    #[serde(with = "string_to_u64")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelResponse {
    /// Converts into a channel of `guild_id`.
    #[must_use]
    pub fn into_channel(self, guild_id: u64) -> Channel {
        Channel::new(
            self.id,
            self.name.unwrap_or_default(),
            ChannelKind::from(self.kind),
        )
        .with_guild(guild_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct AttachmentResponse {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct EmbedMediaResponse {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmbedResponse {
    #[serde(default)]
    pub image: Option<EmbedMediaResponse>,
    #[serde(default)]
    pub thumbnail: Option<EmbedMediaResponse>,
}

impl From<EmbedResponse> for Embed {
    fn from(embed: EmbedResponse) -> Self {
        let mut result = Self::new();
        if let Some(image) = embed.image {
            result = result.with_image(image.url);
        }
        if let Some(thumbnail) = embed.thumbnail {
            result = result.with_thumbnail(thumbnail.url);
        }
        result
    }
}

/// Message from `GET /channels/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(with = "string_to_u64")]
    pub id: u64,
    #[serde(with = "string_to_u64")]
    pub channel_id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentResponse>,
    #[serde(default)]
    pub embeds: Vec<EmbedResponse>,
}

impl MessageResponse {
    /// Creation time from the payload, falling back to the snowflake.
    fn created_at(&self) -> DateTime<Utc> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| snowflake::timestamp_of(self.id))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl From<MessageResponse> for Message {
    fn from(message: MessageResponse) -> Self {
        let timestamp = message.created_at();
        let attachments = message
            .attachments
            .into_iter()
            .map(|a| Attachment::new(a.filename, a.url))
            .collect();
        let embeds = message.embeds.into_iter().map(Embed::from).collect();

        Self::new(message.id, message.channel_id, message.content, timestamp)
            .with_attachments(attachments)
            .with_embeds(embeds)
    }
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    /// Seconds to wait before retrying.
    pub retry_after: f64,
    #[serde(default)]
    pub global: bool,
}
