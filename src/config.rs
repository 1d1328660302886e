//! Hub settings
/// Settings file loading
mod loader;
/// Settings types and validation
mod types;

pub use loader::{
    SETTINGS_FILE_NAME,
    discover_settings,
    load_settings,
};
pub use types::{
    ConfigError,
    FeaturesConfig,
    HubSettings,
    InterpolationConfig,
    ValidationError,
};
