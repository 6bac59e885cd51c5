use regex::Regex;
use std::sync::LazyLock;

use super::filename_resolver::AT_EXTENSION_RE;
use crate::domain::entities::{EmbedMedia, Message};

/// Marker of composite "combined render" previews, left for manual viewing.
pub const COMBINED_RENDER_MARKER: &str = "rendercombined";

/// Host whose thumbnails carry the format as an `@ext` suffix.
pub const SOCIAL_CDN_HOST: &str = "cdn.bsky.app";

static IMAGE_EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(jpg|jpeg|gif|png)\??").expect("valid regex"));

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://\S+").expect("valid regex"));

pub struct UrlExtractor;

impl UrlExtractor {
    /// Collects the image URLs of a message in discovery order: attachments,
    /// embed images and thumbnails, then the first link in the body.
    ///
    /// Social CDN thumbnails may appear twice; callers download both.
    #[must_use]
    pub fn extract_image_urls(message: &Message) -> Vec<String> {
        let mut urls = Vec::new();

        for attachment in message.attachments() {
            if has_image_extension(attachment.url()) {
                urls.push(attachment.url().to_owned());
            }
        }

        for embed in message.embeds() {
            if let Some(url) = embed.image().map(EmbedMedia::url)
                && !is_combined_render(url)
                && has_image_extension(url)
            {
                urls.push(url.to_owned());
            }

            if let Some(url) = embed.thumbnail().map(EmbedMedia::url)
                && !is_combined_render(url)
            {
                if has_image_extension(url) {
                    urls.push(url.to_owned());
                }
                if url.contains(SOCIAL_CDN_HOST) && AT_EXTENSION_RE.is_match(url) {
                    urls.push(url.to_owned());
                }
            }
        }

        if let Some(url) = Self::first_link(message.content())
            && has_image_extension(url)
        {
            urls.push(url.to_owned());
        }

        urls
    }

    /// Returns the body link to hand over for manual viewing when a message
    /// links somewhere but yielded no image.
    #[must_use]
    pub fn unmatched_link<'a>(message: &'a Message, urls: &[String]) -> Option<&'a str> {
        if !urls.is_empty() || !message.content().contains("https://") {
            return None;
        }
        Self::first_link(message.content())
    }

    /// First bare `https://` link in `content`.
    #[must_use]
    pub fn first_link(content: &str) -> Option<&str> {
        BARE_URL_RE.find(content).map(|m| m.as_str())
    }
}

fn has_image_extension(url: &str) -> bool {
    IMAGE_EXTENSION_RE.is_match(url)
}

fn is_combined_render(url: &str) -> bool {
    url.contains(COMBINED_RENDER_MARKER)
}
