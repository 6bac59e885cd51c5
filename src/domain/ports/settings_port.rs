//! Settings persistence port.

use crate::domain::entities::Settings;
use crate::domain::errors::ConfigError;

/// Port for writing the settings document back to stable storage.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsPort: Send + Sync {
    /// Persists the whole document.
    ///
    /// # Errors
    /// Returns error if the document cannot be serialized or written.
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}
