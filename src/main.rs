use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use imgharvest::application::{DownloadImageUseCase, ScanChannelsUseCase};
use imgharvest::domain::ports::LinkOpenerPort;
use imgharvest::infrastructure::{
    AppConfig, CliArgs, DisabledLinkOpener, DiscordClient, HttpImageFetcher, LoadedSettings,
    SettingsStore, SystemLinkOpener,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::from_args(CliArgs::parse());
    init_logging(&config)?;

    info!(version = imgharvest::VERSION, "Starting {}", imgharvest::NAME);

    let store = Arc::new(SettingsStore::new(&config.settings_path));
    let mut settings = match store.load()? {
        LoadedSettings::Ready(settings) => {
            info!(path = %store.path().display(), "Using settings");
            settings
        }
        LoadedSettings::Bootstrapped { path } => {
            println!(
                "No settings file found. Created {} from the default. Please add your bot \
                 token and all other needed information and then run this program again.",
                path.display()
            );
            return Ok(());
        }
    };

    let link_opener: Arc<dyn LinkOpenerPort> =
        if config.open_links && settings.opens_unmatched_links() {
            Arc::new(SystemLinkOpener)
        } else {
            Arc::new(DisabledLinkOpener)
        };

    let scan = ScanChannelsUseCase::new(
        Arc::new(DiscordClient::new()?),
        DownloadImageUseCase::new(Arc::new(HttpImageFetcher::new()?)),
        link_opener,
        store,
    );

    let report = scan.execute(&mut settings).await?;
    info!(%report, "Done");

    Ok(())
}
