//! Chat session port: the Discord capabilities a scan relies on.

use async_trait::async_trait;

use crate::domain::entities::{AuthToken, Channel, ChannelId, Guild, GuildId, Message, User};
use crate::domain::errors::DiscordError;

/// Largest page the message history endpoint serves.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Options for fetching messages from a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchMessagesOptions {
    pub limit: Option<u8>,
    pub after: Option<u64>,
}

impl FetchMessagesOptions {
    /// Sets the page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = Some(match limit {
            0 => 1,
            l if l > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            l => l,
        });
        self
    }

    /// Only return messages with an id strictly greater than `message_id`.
    #[must_use]
    pub const fn after_message(mut self, message_id: u64) -> Self {
        self.after = Some(message_id);
        self
    }

    /// Effective page size.
    #[must_use]
    pub fn page_size(&self) -> u8 {
        self.limit.unwrap_or(MAX_PAGE_SIZE)
    }
}

/// Port for an authenticated chat-platform session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSessionPort: Send + Sync {
    /// Authenticates and returns the account the session runs as.
    async fn connect(&self, token: &AuthToken) -> Result<User, DiscordError>;

    /// Fetches all guilds the account has joined.
    async fn fetch_guilds(&self, token: &AuthToken) -> Result<Vec<Guild>, DiscordError>;

    /// Fetches all channels of a guild.
    async fn fetch_channels(
        &self,
        token: &AuthToken,
        guild_id: GuildId,
    ) -> Result<Vec<Channel>, DiscordError>;

    /// Fetches one page of messages, oldest first.
    ///
    /// With `after` set, only messages whose id is greater than it are returned.
    async fn fetch_messages(
        &self,
        token: &AuthToken,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, DiscordError>;

    /// Ends the session. Later calls fail with `DiscordError::SessionClosed`.
    async fn close(&self);
}
