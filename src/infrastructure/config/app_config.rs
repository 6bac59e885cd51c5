//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use super::settings_store::SETTINGS_FILE_NAME;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Process-level configuration. Scan targets live in the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Settings file path.
    pub settings_path: PathBuf,

    /// Log file path. Logs go to stderr when unset.
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    pub log_level: LogLevel,

    /// Hand unmatched links to the desktop browser.
    pub open_links: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(SETTINGS_FILE_NAME),
            log_path: None,
            log_level: LogLevel::default(),
            open_links: true,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from defaults and CLI arguments.
    #[must_use]
    pub fn from_args(args: CliArgs) -> Self {
        let mut config = Self::default();
        config.merge_with_args(args);
        config
    }

    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(settings_path) = args.settings {
            self.settings_path = settings_path;
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if args.no_open_links {
            self.open_links = false;
        }
    }
}
