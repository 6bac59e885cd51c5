//! Channel scan use case: one incremental pass over every configured channel.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::DownloadImageUseCase;
use crate::application::dto::ScanReport;
use crate::application::services::cursor::{self, CursorError};
use crate::application::services::{UrlExtractor, stored_filename};
use crate::domain::entities::{
    AuthToken, Channel, ChannelId, ChannelSettings, Guild, GuildId, Message, Settings,
};
use crate::domain::errors::{ConfigError, DiscordError, DownloadError};
use crate::domain::ports::{
    ChatSessionPort, FetchMessagesOptions, LinkOpenerPort, MAX_PAGE_SIZE, SettingsPort,
};
use crate::domain::snowflake;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("discord session failed: {0}")]
    Session(#[from] DiscordError),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("invalid scan cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    #[error("failed to persist settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("failed to prepare download folder: {0}")]
    DownloadFolder(#[source] std::io::Error),
}

/// Flushes the settings document when a channel scan ends.
///
/// `commit` saves and reports the result. A checkpoint dropped without a
/// commit (the scan future was cancelled or panicked) saves from `Drop` and
/// logs failures.
struct ChannelCheckpoint<'a> {
    store: &'a dyn SettingsPort,
    settings: &'a mut Settings,
    committed: bool,
}

impl<'a> ChannelCheckpoint<'a> {
    fn new(store: &'a dyn SettingsPort, settings: &'a mut Settings) -> Self {
        Self {
            store,
            settings,
            committed: false,
        }
    }

    fn channel_mut(
        &mut self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Option<&mut ChannelSettings> {
        self.settings.channel_mut(guild_id, channel_id)
    }

    fn commit(mut self) -> Result<(), ConfigError> {
        self.committed = true;
        self.store.save(&*self.settings)
    }
}

impl Drop for ChannelCheckpoint<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = self.store.save(&*self.settings) {
            error!(error = %e, "Failed to persist settings after interrupted channel scan");
        }
    }
}

/// State carried through one pass.
struct ScanContext {
    token: AuthToken,
    download_folder: PathBuf,
    report: ScanReport,
}

/// Scans configured channels once and downloads new images.
pub struct ScanChannelsUseCase {
    session: Arc<dyn ChatSessionPort>,
    downloader: DownloadImageUseCase,
    link_opener: Arc<dyn LinkOpenerPort>,
    settings_store: Arc<dyn SettingsPort>,
    page_size: u8,
}

impl ScanChannelsUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(
        session: Arc<dyn ChatSessionPort>,
        downloader: DownloadImageUseCase,
        link_opener: Arc<dyn LinkOpenerPort>,
        settings_store: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            session,
            downloader,
            link_opener,
            settings_store,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Overrides the history page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }

    /// Runs one full pass and closes the session, whether or not the pass
    /// succeeded.
    ///
    /// `settings` is updated in place and persisted after every channel.
    ///
    /// # Errors
    /// Returns the first fatal error: session failures, non-404 download
    /// failures, unparseable cursors, or settings that cannot be saved.
    pub async fn execute(&self, settings: &mut Settings) -> Result<ScanReport, ScanError> {
        let result = self.scan(settings).await;
        self.session.close().await;
        result
    }

    async fn scan(&self, settings: &mut Settings) -> Result<ScanReport, ScanError> {
        let token = settings.auth_token().ok_or_else(|| {
            DiscordError::invalid_format("token in settings does not look like a Discord bot token")
        })?;

        let user = self.session.connect(&token).await?;
        info!(user = %user, bot = user.is_bot(), "Logged in");

        tokio::fs::create_dir_all(&settings.download_folder)
            .await
            .map_err(ScanError::DownloadFolder)?;

        let mut ctx = ScanContext {
            token,
            download_folder: settings.download_folder.clone(),
            report: ScanReport::default(),
        };

        for guild in self.session.fetch_guilds(&ctx.token).await? {
            if settings.server(guild.id()).is_none() {
                continue;
            }
            self.scan_guild(&guild, settings, &mut ctx).await?;
        }

        info!(report = %ctx.report, "Scan complete");
        Ok(ctx.report)
    }

    async fn scan_guild(
        &self,
        guild: &Guild,
        settings: &mut Settings,
        ctx: &mut ScanContext,
    ) -> Result<(), ScanError> {
        info!(guild = %guild.name(), guild_id = %guild.id(), "Scanning server");

        let channels = self.session.fetch_channels(&ctx.token, guild.id()).await?;

        for channel in channels.iter().filter(|c| c.is_text_channel()) {
            let mut checkpoint = ChannelCheckpoint::new(self.settings_store.as_ref(), settings);
            let Some(channel_settings) = checkpoint.channel_mut(guild.id(), channel.id()) else {
                // Not configured; nothing changed, nothing to save.
                checkpoint.committed = true;
                continue;
            };

            ctx.report.channels_scanned += 1;
            let result = self.scan_channel(channel, channel_settings, ctx).await;
            let saved = checkpoint.commit();
            if let (Err(scan_error), Err(save_error)) = (&result, &saved) {
                error!(
                    channel_id = %channel.id(),
                    error = %save_error,
                    cause = %scan_error,
                    "Failed to persist settings after channel scan failure"
                );
            }
            result?;
            saved?;
        }

        Ok(())
    }

    async fn scan_channel(
        &self,
        channel: &Channel,
        channel_settings: &mut ChannelSettings,
        ctx: &mut ScanContext,
    ) -> Result<(), ScanError> {
        info!(channel = %channel.name(), channel_id = %channel.id(), "Scanning channel");

        let stored = channel_settings.last_parsed_message_time.as_deref();
        let mut newest = cursor::parse_cursor(stored)?;
        let mut after = snowflake::highest_at(newest);
        debug!(start = %newest, after, "Resolved channel cursor");

        loop {
            let options = FetchMessagesOptions::default()
                .with_limit(self.page_size)
                .after_message(after);
            let page = self
                .session
                .fetch_messages(&ctx.token, channel.id(), options)
                .await?;

            for message in &page {
                self.process_message(message, ctx).await?;

                // Only reached once every URL of the message has finished.
                if message.timestamp() >= newest {
                    newest = message.timestamp();
                    channel_settings.last_parsed_message_time =
                        Some(cursor::format_cursor(newest));
                }
                after = after.max(message.id().as_u64());
                ctx.report.messages_processed += 1;
            }

            if page.is_empty() || page.len() < usize::from(options.page_size()) {
                break;
            }
        }

        Ok(())
    }

    async fn process_message(
        &self,
        message: &Message,
        ctx: &mut ScanContext,
    ) -> Result<(), ScanError> {
        let urls = UrlExtractor::extract_image_urls(message);
        debug!(
            message_id = %message.id(),
            content = %message.content(),
            urls = urls.len(),
            "Message"
        );

        if let Some(link) = UrlExtractor::unmatched_link(message, &urls) {
            warn!(
                message_id = %message.id(),
                content = %message.content(),
                "No image URLs found for message"
            );
            self.link_opener.open(link);
            ctx.report.links_opened += 1;
        }

        for url in &urls {
            let filename = stored_filename(message.id(), url);
            let outcome = self
                .downloader
                .execute(url, &ctx.download_folder, &filename)
                .await?;
            ctx.report.record(&outcome);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::{TempDir, tempdir};

    use crate::domain::entities::{Attachment, ChannelKind, User};
    use crate::domain::ports::FetchedImage;
    use crate::domain::ports::mocks::{
        MockChatSessionPort, MockImageFetchPort, MockLinkOpenerPort, MockSettingsPort,
    };

    const GUILD: GuildId = GuildId(10);
    const CHANNEL: ChannelId = ChannelId(20);

    fn make_valid_token() -> String {
        "MTIzNDU2Nzg5MDEyMzQ1Njc4OQ.XXXXXX.YYYYYYYYYYYYYYYYYYYYYYYYYYYY".to_string()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    fn message(time: DateTime<Utc>, content: &str) -> Message {
        Message::new(snowflake::lowest_at(time) + 1, CHANNEL, content, time)
    }

    fn with_image(message: Message, name: &str) -> Message {
        let url = format!("https://cdn.discordapp.com/attachments/20/1/{name}?ex=1");
        message.with_attachments(vec![Attachment::new(name, url)])
    }

    /// In-memory Discord session.
    #[derive(Default)]
    struct FakeSession {
        guilds: Vec<Guild>,
        channels: HashMap<GuildId, Vec<Channel>>,
        messages: HashMap<ChannelId, Vec<Message>>,
        fetches: Mutex<Vec<(ChannelId, FetchMessagesOptions)>>,
        connects: AtomicUsize,
        closed: AtomicBool,
    }

    impl FakeSession {
        fn with_channel(messages: Vec<Message>) -> Self {
            let mut session = Self {
                guilds: vec![Guild::new(GUILD, "art club")],
                ..Self::default()
            };
            session.channels.insert(
                GUILD,
                vec![
                    Channel::new(CHANNEL, "pics", ChannelKind::Text).with_guild(GUILD),
                    Channel::new(21_u64, "voice", ChannelKind::Voice).with_guild(GUILD),
                ],
            );
            session.messages.insert(CHANNEL, messages);
            session
        }

        fn fetched_channels(&self) -> Vec<ChannelId> {
            self.fetches.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }
    }

    #[async_trait::async_trait]
    impl ChatSessionPort for FakeSession {
        async fn connect(&self, _token: &AuthToken) -> Result<User, DiscordError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(User::new(1_u64, "harvester", "0", true))
        }

        async fn fetch_guilds(&self, _token: &AuthToken) -> Result<Vec<Guild>, DiscordError> {
            Ok(self.guilds.clone())
        }

        async fn fetch_channels(
            &self,
            _token: &AuthToken,
            guild_id: GuildId,
        ) -> Result<Vec<Channel>, DiscordError> {
            Ok(self.channels.get(&guild_id).cloned().unwrap_or_default())
        }

        async fn fetch_messages(
            &self,
            _token: &AuthToken,
            channel_id: ChannelId,
            options: FetchMessagesOptions,
        ) -> Result<Vec<Message>, DiscordError> {
            self.fetches.lock().unwrap().push((channel_id, options));
            let after = options.after.unwrap_or(0);
            let mut page: Vec<Message> = self
                .messages
                .get(&channel_id)
                .into_iter()
                .flatten()
                .filter(|m| m.id().as_u64() > after)
                .cloned()
                .collect();
            page.sort_by_key(Message::id);
            page.truncate(usize::from(options.page_size()));
            Ok(page)
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Settings store that keeps every saved snapshot.
    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<Settings>>,
    }

    impl RecordingStore {
        fn last(&self) -> Option<Settings> {
            self.saved.lock().unwrap().last().cloned()
        }

        fn count(&self) -> usize {
            self.saved.lock().unwrap().len()
        }
    }

    impl SettingsPort for RecordingStore {
        fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
            self.saved.lock().unwrap().push(settings.clone());
            Ok(())
        }
    }

    struct Harness {
        session: Arc<FakeSession>,
        store: Arc<RecordingStore>,
        use_case: ScanChannelsUseCase,
        settings: Settings,
        dir: TempDir,
    }

    impl Harness {
        fn new(session: FakeSession, fetcher: MockImageFetchPort, opener: MockLinkOpenerPort) -> Self {
            let dir = tempdir().unwrap();
            let session = Arc::new(session);
            let store = Arc::new(RecordingStore::default());
            let use_case = ScanChannelsUseCase::new(
                session.clone(),
                DownloadImageUseCase::new(Arc::new(fetcher)),
                Arc::new(opener),
                store.clone(),
            );
            let settings = Settings::new(make_valid_token(), dir.path().join("images"))
                .with_channel(GUILD, CHANNEL);
            Self {
                session,
                store,
                use_case,
                settings,
                dir,
            }
        }

        fn with_cursor(mut self, cursor: &str) -> Self {
            self.settings
                .channel_mut(GUILD, CHANNEL)
                .unwrap()
                .last_parsed_message_time = Some(cursor.to_string());
            self
        }

        fn stored_cursor(&self) -> Option<String> {
            self.settings
                .channel(GUILD, CHANNEL)
                .and_then(|c| c.last_parsed_message_time.clone())
        }

        fn downloaded_files(&self) -> Vec<String> {
            let mut names: Vec<String> = std::fs::read_dir(self.dir.path().join("images"))
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }

        async fn run(&mut self) -> Result<ScanReport, ScanError> {
            self.use_case.execute(&mut self.settings).await
        }
    }

    fn serving(status: u16) -> MockImageFetchPort {
        let mut fetcher = MockImageFetchPort::new();
        fetcher
            .expect_fetch()
            .returning(move |_| Ok(FetchedImage::new(status, &b"image"[..])));
        fetcher
    }

    fn quiet_opener() -> MockLinkOpenerPort {
        let mut opener = MockLinkOpenerPort::new();
        opener.expect_open().never();
        opener
    }

    #[tokio::test]
    async fn test_only_image_message_is_downloaded_and_cursor_reaches_last() {
        let m1 = message(at(10, 0, 0), "hello");
        let m2 = with_image(message(at(10, 5, 0), "look"), "cat.png");
        let m3 = message(at(10, 10, 0), "nice");
        let mut h = Harness::new(
            FakeSession::with_channel(vec![m1, m2.clone(), m3.clone()]),
            serving(200),
            quiet_opener(),
        );

        let report = h.run().await.unwrap();

        assert_eq!(h.downloaded_files(), vec![format!("{}_cat.png", m2.id())]);
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(m3.timestamp())));
        assert_eq!(report.messages_processed, 3);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.channels_scanned, 1);
        assert_eq!(h.store.count(), 1);
        assert_eq!(h.store.last(), Some(h.settings.clone()));
        assert!(h.session.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stored_cursor_excludes_older_and_equal_messages() {
        let before = with_image(message(at(11, 59, 59), ""), "old.png");
        let exact = with_image(message(at(12, 0, 0), ""), "same.png");
        let after = with_image(message(at(12, 0, 1), ""), "new.png");
        let mut h = Harness::new(
            FakeSession::with_channel(vec![before, exact, after.clone()]),
            serving(200),
            quiet_opener(),
        )
        .with_cursor("2024-06-01 12:00:00");

        let report = h.run().await.unwrap();

        assert_eq!(report.messages_processed, 1);
        assert_eq!(h.downloaded_files(), vec![format!("{}_new.png", after.id())]);
        assert_eq!(h.stored_cursor(), Some("2024-06-01 12:00:01.000000+0000".to_string()));
    }

    #[tokio::test]
    async fn test_missing_cursor_starts_at_default_epoch() {
        let last_year = message(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap(), "");
        let new_year = message(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap(), "");
        let mut h = Harness::new(
            FakeSession::with_channel(vec![last_year, new_year.clone()]),
            serving(200),
            quiet_opener(),
        );

        let report = h.run().await.unwrap();

        let first_fetch = h.session.fetches.lock().unwrap()[0].1;
        assert_eq!(
            first_fetch.after,
            Some(snowflake::highest_at(cursor::default_start()))
        );
        assert_eq!(report.messages_processed, 1);
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(new_year.timestamp())));
    }

    #[tokio::test]
    async fn test_not_found_does_not_stop_the_channel() {
        let m1 = with_image(message(at(9, 0, 0), ""), "gone.png");
        let m2 = with_image(message(at(9, 1, 0), ""), "here.png");
        let mut fetcher = MockImageFetchPort::new();
        fetcher.expect_fetch().returning(|url| {
            let status = if url.contains("gone") { 404 } else { 200 };
            Ok(FetchedImage::new(status, &b"image"[..]))
        });
        let mut h = Harness::new(
            FakeSession::with_channel(vec![m1, m2.clone()]),
            fetcher,
            quiet_opener(),
        );

        let report = h.run().await.unwrap();

        assert_eq!(report.not_found, 1);
        assert_eq!(report.downloaded, 1);
        assert_eq!(h.downloaded_files(), vec![format!("{}_here.png", m2.id())]);
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(m2.timestamp())));
    }

    #[tokio::test]
    async fn test_server_error_aborts_and_keeps_cursor_at_previous_message() {
        let m1 = with_image(message(at(9, 0, 0), ""), "ok.png");
        let m2 = with_image(message(at(9, 1, 0), ""), "broken.png");
        let m3 = with_image(message(at(9, 2, 0), ""), "never.png");
        let mut fetcher = MockImageFetchPort::new();
        fetcher.expect_fetch().times(2).returning(|url| {
            let status = if url.contains("broken") { 500 } else { 200 };
            Ok(FetchedImage::new(status, &b"boom"[..]))
        });
        let mut h = Harness::new(
            FakeSession::with_channel(vec![m1.clone(), m2, m3]),
            fetcher,
            quiet_opener(),
        );

        let err = h.run().await.unwrap_err();

        assert!(matches!(
            err,
            ScanError::Download(DownloadError::UnexpectedStatus { status: 500, .. })
        ));
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(m1.timestamp())));
        assert_eq!(h.store.count(), 1, "progress is persisted on failure");
        assert_eq!(h.store.last(), Some(h.settings.clone()));
        assert!(h.session.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unconfigured_guilds_and_channels_are_skipped() {
        let mut session = FakeSession::with_channel(vec![message(at(8, 0, 0), "")]);
        session.guilds.push(Guild::new(99_u64, "other"));
        session.channels.insert(
            GuildId(99),
            vec![Channel::new(98_u64, "elsewhere", ChannelKind::Text)],
        );
        session
            .channels
            .get_mut(&GUILD)
            .unwrap()
            .push(Channel::new(22_u64, "chat", ChannelKind::Text));
        session
            .messages
            .insert(ChannelId(98), vec![message(at(8, 0, 0), "")]);
        let mut h = Harness::new(session, serving(200), quiet_opener());

        let report = h.run().await.unwrap();

        assert_eq!(h.session.fetched_channels(), vec![CHANNEL]);
        assert_eq!(report.channels_scanned, 1);
        assert_eq!(h.store.count(), 1);
    }

    #[tokio::test]
    async fn test_configured_non_text_channel_is_skipped() {
        let mut h = Harness::new(
            FakeSession::with_channel(vec![]),
            serving(200),
            quiet_opener(),
        );
        h.settings = h.settings.clone().with_channel(GUILD, ChannelId(21));

        let report = h.run().await.unwrap();

        assert_eq!(h.session.fetched_channels(), vec![CHANNEL]);
        assert_eq!(report.channels_scanned, 1);
    }

    #[tokio::test]
    async fn test_history_is_read_page_by_page() {
        let messages: Vec<Message> = (0..5)
            .map(|i| with_image(message(at(7, i, 0), ""), &format!("p{i}.png")))
            .collect();
        let last = messages[4].clone();
        let mut h = Harness::new(
            FakeSession::with_channel(messages),
            serving(200),
            quiet_opener(),
        );
        h.use_case = ScanChannelsUseCase::new(
            h.session.clone(),
            DownloadImageUseCase::new(Arc::new(serving(200))),
            Arc::new(quiet_opener()),
            h.store.clone(),
        )
        .with_page_size(2);

        let report = h.run().await.unwrap();

        assert_eq!(report.messages_processed, 5);
        assert_eq!(report.downloaded, 5);
        assert_eq!(h.session.fetched_channels().len(), 3);
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(last.timestamp())));
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_files_and_seen_messages() {
        let m1 = with_image(message(at(6, 0, 0), ""), "once.png");
        let mut fetcher = MockImageFetchPort::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(FetchedImage::new(200, &b"image"[..])));
        let mut h = Harness::new(FakeSession::with_channel(vec![m1]), fetcher, quiet_opener());

        let first = h.run().await.unwrap();
        let second = h.run().await.unwrap();

        assert_eq!(first.downloaded, 1);
        assert_eq!(second.messages_processed, 0);
        assert_eq!(h.session.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unmatched_link_is_opened() {
        let link = "https://fixvx.com/someone/status/123";
        let mut opener = MockLinkOpenerPort::new();
        opener
            .expect_open()
            .withf(|url| url.contains("fixvx.com/someone"))
            .times(1)
            .return_const(());
        let mut h = Harness::new(
            FakeSession::with_channel(vec![message(at(5, 0, 0), &format!("wow {link}"))]),
            serving(200),
            opener,
        );

        let report = h.run().await.unwrap();

        assert_eq!(report.links_opened, 1);
        assert!(h.downloaded_files().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_cursor_is_fatal_but_settings_are_saved() {
        let mut h = Harness::new(
            FakeSession::with_channel(vec![message(at(5, 0, 0), "")]),
            serving(200),
            quiet_opener(),
        )
        .with_cursor("last tuesday");

        let err = h.run().await.unwrap_err();

        assert!(matches!(err, ScanError::InvalidCursor(_)));
        assert!(h.session.fetched_channels().is_empty());
        assert_eq!(h.store.count(), 1);
        assert!(h.session.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_placeholder_token_never_connects() {
        let mut h = Harness::new(FakeSession::with_channel(vec![]), serving(200), quiet_opener());
        h.settings.token = "YOUR_BOT_TOKEN".to_string();

        let err = h.run().await.unwrap_err();

        assert!(matches!(
            err,
            ScanError::Session(DiscordError::InvalidTokenFormat { .. })
        ));
        assert_eq!(h.session.connects.load(Ordering::SeqCst), 0);
        assert!(h.session.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_rejected_token_still_closes_session() {
        let mut session = MockChatSessionPort::new();
        session
            .expect_connect()
            .times(1)
            .returning(|_| Err(DiscordError::rejected("invalid or expired token")));
        session.expect_fetch_guilds().never();
        session.expect_close().times(1).return_const(());
        let use_case = ScanChannelsUseCase::new(
            Arc::new(session),
            DownloadImageUseCase::new(Arc::new(MockImageFetchPort::new())),
            Arc::new(quiet_opener()),
            Arc::new(RecordingStore::default()),
        );
        let mut settings = Settings::new(make_valid_token(), "unused");

        let err = use_case.execute(&mut settings).await.unwrap_err();

        assert!(matches!(
            err,
            ScanError::Session(DiscordError::TokenRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_settings_save_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let mut store = MockSettingsPort::new();
        store.expect_save().times(1).returning(|_| {
            Err(ConfigError::Io(std::io::Error::other("disk full")))
        });
        let use_case = ScanChannelsUseCase::new(
            Arc::new(FakeSession::with_channel(vec![message(at(4, 0, 0), "")])),
            DownloadImageUseCase::new(Arc::new(serving(200))),
            Arc::new(quiet_opener()),
            Arc::new(store),
        );
        let mut settings =
            Settings::new(make_valid_token(), dir.path()).with_channel(GUILD, CHANNEL);

        let err = use_case.execute(&mut settings).await.unwrap_err();

        assert!(matches!(err, ScanError::Settings(ConfigError::Io(_))));
    }

    fn two_channel_session(first: Vec<Message>, second: Vec<Message>) -> FakeSession {
        let mut session = FakeSession::with_channel(first);
        session.channels.insert(
            GUILD,
            vec![
                Channel::new(CHANNEL, "pics", ChannelKind::Text).with_guild(GUILD),
                Channel::new(21_u64, "more-pics", ChannelKind::Text).with_guild(GUILD),
            ],
        );
        session.messages.insert(ChannelId(21), second);
        session
    }

    #[tokio::test]
    async fn test_finished_channel_is_saved_before_sibling_fails() {
        let good = with_image(message(at(0, 0, 0), ""), "good.png");
        let bad = with_image(message(at(0, 1, 0), ""), "bad.png");
        let mut fetcher = MockImageFetchPort::new();
        fetcher.expect_fetch().times(2).returning(|url| {
            let status = if url.contains("bad") { 500 } else { 200 };
            Ok(FetchedImage::new(status, &b"image"[..]))
        });
        let mut h = Harness::new(
            two_channel_session(vec![good.clone()], vec![bad]),
            fetcher,
            quiet_opener(),
        );
        h.settings = h.settings.clone().with_channel(GUILD, ChannelId(21));

        let err = h.run().await.unwrap_err();

        assert!(matches!(
            err,
            ScanError::Download(DownloadError::UnexpectedStatus { status: 500, .. })
        ));
        let saved = h.store.saved.lock().unwrap().clone();
        assert_eq!(saved.len(), 2, "one save per channel");
        let good_cursor = Some(cursor::format_cursor(good.timestamp()));
        for snapshot in &saved {
            let first = snapshot.channel(GUILD, CHANNEL).unwrap();
            assert_eq!(first.last_parsed_message_time, good_cursor);
        }
        let second = saved[1].channel(GUILD, ChannelId(21)).unwrap();
        assert_eq!(second.last_parsed_message_time, None);
    }

    #[test]
    fn test_checkpoint_saves_when_dropped_without_commit() {
        let store = RecordingStore::default();
        let mut settings =
            Settings::new(make_valid_token(), "images").with_channel(GUILD, CHANNEL);

        {
            let mut checkpoint = ChannelCheckpoint::new(&store, &mut settings);
            checkpoint
                .channel_mut(GUILD, CHANNEL)
                .unwrap()
                .last_parsed_message_time = Some("2024-06-01".to_string());
        }

        assert_eq!(store.count(), 1);
        let saved = store.last().unwrap();
        assert_eq!(
            saved
                .channel(GUILD, CHANNEL)
                .and_then(|c| c.last_parsed_message_time.as_deref()),
            Some("2024-06-01")
        );
    }

    #[test]
    fn test_committed_checkpoint_saves_once() {
        let store = RecordingStore::default();
        let mut settings =
            Settings::new(make_valid_token(), "images").with_channel(GUILD, CHANNEL);

        let checkpoint = ChannelCheckpoint::new(&store, &mut settings);
        checkpoint.commit().unwrap();

        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_zero_page_size_still_terminates() {
        let m1 = message(at(3, 0, 0), "");
        let m2 = message(at(3, 1, 0), "");
        let mut h = Harness::new(
            FakeSession::with_channel(vec![m1, m2.clone()]),
            serving(200),
            quiet_opener(),
        );
        h.use_case = ScanChannelsUseCase::new(
            h.session.clone(),
            DownloadImageUseCase::new(Arc::new(serving(200))),
            Arc::new(quiet_opener()),
            h.store.clone(),
        )
        .with_page_size(0);

        let report = h.run().await.unwrap();

        assert_eq!(report.messages_processed, 2);
        assert_eq!(h.session.fetched_channels().len(), 3);
        assert_eq!(h.stored_cursor(), Some(cursor::format_cursor(m2.timestamp())));
    }

    #[tokio::test]
    async fn test_scan_error_wins_when_save_also_fails() {
        let dir = tempdir().unwrap();
        let mut store = MockSettingsPort::new();
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(ConfigError::Io(std::io::Error::other("read-only"))));
        let image = with_image(message(at(2, 0, 0), ""), "x.png");
        let session = FakeSession::with_channel(vec![image]);
        let use_case = ScanChannelsUseCase::new(
            Arc::new(session),
            DownloadImageUseCase::new(Arc::new(serving(503))),
            Arc::new(quiet_opener()),
            Arc::new(store),
        );
        let mut settings =
            Settings::new(make_valid_token(), dir.path()).with_channel(GUILD, CHANNEL);

        let err = use_case.execute(&mut settings).await.unwrap_err();

        assert!(matches!(
            err,
            ScanError::Download(DownloadError::UnexpectedStatus { status: 503, .. })
        ));
    }
}
