use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "imgharvest",
    version,
    about = "Downloads new images posted in configured Discord channels",
    long_about = None
)]
pub struct CliArgs {
    /// Settings file path.
    #[arg(short, long, value_name = "PATH", env = "IMGHARVEST_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log unmatched links instead of opening them in the browser.
    #[arg(long)]
    pub no_open_links: bool,
}
