//! Application configuration and settings persistence.

pub mod app_config;
pub mod args;
pub mod settings_store;

pub use app_config::{AppConfig, LogLevel};
pub use args::CliArgs;
pub use settings_store::{LoadedSettings, SETTINGS_FILE_NAME, SettingsStore};
