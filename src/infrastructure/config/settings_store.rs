use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::entities::Settings;
use crate::domain::errors::ConfigError;
use crate::domain::ports::SettingsPort;

/// Default settings file name, resolved against the working directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const TEMPLATE_SUFFIX: &str = ".dist";
const BUILTIN_TEMPLATE: &str = include_str!("../../../settings.json.dist");

/// Result of [`SettingsStore::load`].
#[derive(Debug)]
pub enum LoadedSettings {
    /// The settings file exists and parsed.
    Ready(Settings),
    /// No settings file existed; one was created from the template and must
    /// be filled in before the next run.
    Bootstrapped {
        /// Where the fresh file was written.
        path: PathBuf,
    },
}

/// Reads and atomically rewrites the JSON settings document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    template_path: PathBuf,
}

impl SettingsStore {
    /// Creates a store for `path`. The template is looked up next to it as
    /// `<path>.dist`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut template = path.clone().into_os_string();
        template.push(TEMPLATE_SUFFIX);
        Self {
            path,
            template_path: PathBuf::from(template),
        }
    }

    /// Overrides the template location.
    #[must_use]
    pub fn with_template(mut self, template_path: impl Into<PathBuf>) -> Self {
        self.template_path = template_path.into();
        self
    }

    /// Returns the settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, creating the file from the template if it is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or created.
    pub fn load(&self) -> Result<LoadedSettings, ConfigError> {
        if !self.path.exists() {
            self.bootstrap()?;
            return Ok(LoadedSettings::Bootstrapped {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            servers = settings.servers.len(),
            "Loaded settings"
        );
        Ok(LoadedSettings::Ready(settings))
    }

    fn bootstrap(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if self.template_path.exists() {
            info!(
                template = %self.template_path.display(),
                path = %self.path.display(),
                "Settings file not found, copying template"
            );
            fs::copy(&self.template_path, &self.path)?;
        } else {
            info!(
                path = %self.path.display(),
                "Settings file and template not found, writing built-in template"
            );
            Self::write_atomic(&self.path, BUILTIN_TEMPLATE)?;
        }
        Ok(())
    }

    fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
        let parent = match path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(ConfigError::InvalidPath(path.display().to_string())),
        };
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

impl SettingsPort for SettingsStore {
    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(settings)?;
        Self::write_atomic(&self.path, &content)?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}
