//! Discord REST client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::dto::{
    ChannelResponse, ErrorResponse, GuildResponse, MessageResponse, RateLimitResponse,
    UserResponse,
};
use crate::domain::entities::{AuthToken, Channel, ChannelId, Guild, GuildId, Message, User};
use crate::domain::errors::DiscordError;
use crate::domain::ports::{ChatSessionPort, FetchMessagesOptions};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/imgharvest/imgharvest, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GUILD_PAGE_LIMIT: usize = 200;
const MAX_RATE_LIMIT_RETRIES: u32 = 5;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Discord REST session authenticated as a bot.
pub struct DiscordClient {
    client: Client,
    base_url: String,
    closed: AtomicBool,
}

impl DiscordClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, DiscordError> {
        Self::with_base_url(DISCORD_API_BASE)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscordError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), DiscordError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DiscordError::SessionClosed);
        }
        Ok(())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &AuthToken,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DiscordError> {
        self.ensure_open()?;
        let url = format!("{}{path}", self.base_url);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .get(&url)
                .header(header::AUTHORIZATION, token.authorization())
                .query(query)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, path, "Failed to reach Discord API");
                    map_send_error(&e)
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                let header_value = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let body = response.text().await.unwrap_or_default();
                let wait = retry_delay(&body, header_value.as_deref());
                retries += 1;
                warn!(path, wait_ms = wait.as_millis(), retries, "Rate limited by Discord");
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(handle_error_response(status, response).await);
            }

            return response.json::<T>().await.map_err(|e| {
                warn!(error = %e, path, "Failed to parse Discord response");
                DiscordError::unexpected(format!("failed to parse response: {e}"))
            });
        }
    }
}

fn map_send_error(e: &reqwest::Error) -> DiscordError {
    if e.is_timeout() {
        DiscordError::network("request timed out")
    } else if e.is_connect() {
        DiscordError::network("failed to connect to Discord")
    } else {
        DiscordError::network(e.to_string())
    }
}

async fn handle_error_response(status: StatusCode, response: Response) -> DiscordError {
    let error_message = match response.json::<ErrorResponse>().await {
        Ok(error) => error.message,
        Err(_) => format!("HTTP {status}"),
    };

    match status {
        StatusCode::UNAUTHORIZED => DiscordError::rejected("invalid or expired token"),
        StatusCode::FORBIDDEN => DiscordError::rejected(format!("access denied: {error_message}")),
        StatusCode::TOO_MANY_REQUESTS => DiscordError::RateLimited {
            retry_after_ms: 5000,
        },
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            DiscordError::network("Discord API is temporarily unavailable")
        }
        _ => DiscordError::unexpected(format!("unexpected response: {status} - {error_message}")),
    }
}

/// Wait requested by a 429: the JSON `retry_after`, then the `Retry-After`
/// header, then a fixed default.
fn retry_delay(body: &str, header_value: Option<&str>) -> Duration {
    serde_json::from_str::<RateLimitResponse>(body)
        .ok()
        .map(|r| r.retry_after)
        .or_else(|| header_value.and_then(|v| v.trim().parse::<f64>().ok()))
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[async_trait]
impl ChatSessionPort for DiscordClient {
    async fn connect(&self, token: &AuthToken) -> Result<User, DiscordError> {
        debug!("Validating token against Discord API");

        let user: UserResponse = self.get(token, "/users/@me", &[]).await?;

        debug!(user_id = user.id, username = %user.username, "Token validated successfully");
        Ok(user.into())
    }

    async fn fetch_guilds(&self, token: &AuthToken) -> Result<Vec<Guild>, DiscordError> {
        let mut guilds = Vec::new();
        let mut after: Option<u64> = None;

        loop {
            let mut query = vec![("limit", GUILD_PAGE_LIMIT.to_string())];
            if let Some(after) = after {
                query.push(("after", after.to_string()));
            }

            let page: Vec<GuildResponse> = self.get(token, "/users/@me/guilds", &query).await?;
            let full_page = page.len() >= GUILD_PAGE_LIMIT;
            after = page.iter().map(|g| g.id).max();
            guilds.extend(page.into_iter().map(Guild::from));

            if !full_page || after.is_none() {
                break;
            }
        }

        debug!(count = guilds.len(), "Fetched guilds");
        Ok(guilds)
    }

    async fn fetch_channels(
        &self,
        token: &AuthToken,
        guild_id: GuildId,
    ) -> Result<Vec<Channel>, DiscordError> {
        let path = format!("/guilds/{guild_id}/channels");
        let channels: Vec<ChannelResponse> = self.get(token, &path, &[]).await?;

        Ok(channels
            .into_iter()
            .map(|c| c.into_channel(guild_id.as_u64()))
            .collect())
    }

    async fn fetch_messages(
        &self,
        token: &AuthToken,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, DiscordError> {
        let path = format!("/channels/{channel_id}/messages");
        let mut query = vec![("limit", options.page_size().to_string())];
        if let Some(after) = options.after {
            query.push(("after", after.to_string()));
        }

        let page: Vec<MessageResponse> = self.get(token, &path, &query).await?;
        let mut messages: Vec<Message> = page.into_iter().map(Message::from).collect();
        // The API lists newest first.
        messages.sort_by_key(Message::id);

        debug!(
            channel_id = %channel_id,
            count = messages.len(),
            after = ?options.after,
            "Fetched messages"
        );
        Ok(messages)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Discord session closed");
        }
    }
}
