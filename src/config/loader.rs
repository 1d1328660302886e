//! Settings file loading.
//!
//! Every function returns validated settings; callers never see a
//! `HubSettings` that failed [`HubSettings::validate`].

use std::path::Path;

use super::{
    ConfigError,
    HubSettings,
};

/// Name of the settings file looked up in a directory.
pub const SETTINGS_FILE_NAME: &str = ".locale-hub.json";

/// Read and validate the settings file at `path`.
///
/// Fields missing from the file take their default value.
///
/// # Errors
/// - [`ConfigError::IoError`] when the file cannot be read
/// - [`ConfigError::ParseError`] for malformed JSON
/// - [`ConfigError::ValidationErrors`] listing every invalid field
pub fn load_settings(path: &Path) -> Result<HubSettings, ConfigError> {
    tracing::debug!(path = %path.display(), "Loading settings");

    let content = std::fs::read_to_string(path)?;
    let settings: HubSettings = serde_json::from_str(&content)?;

    settings.into_validated()
}

/// Settings of `dir`: its `.locale-hub.json` when present, defaults otherwise.
pub fn discover_settings(dir: &Path) -> Result<HubSettings, ConfigError> {
    let path = dir.join(SETTINGS_FILE_NAME);
    if !path.is_file() {
        tracing::debug!(dir = %dir.display(), "No settings file, using defaults");
        return Ok(HubSettings::default());
    }

    load_settings(&path)
}
