use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Upper bound for `interpolation.maxDepth`.
const MAX_INTERPOLATION_DEPTH: usize = 256;

/// One invalid settings field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "interpolation.maxDepth")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    /// Error on `field_path` with a human readable `message`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Failure to load or accept settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered list, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings of a hub, read from `.locale-hub.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSettings {
    /// Root directory for bundle working directories and archives.
    ///
    /// Working trees land in `<workRoot>/projects/`, archives in
    /// `<workRoot>/archives/<projectId>/`.
    pub work_root: PathBuf,

    /// File name of the packaged bundle, prefixed with a generation id.
    pub archive_name: String,

    pub interpolation: InterpolationConfig,
    pub features: FeaturesConfig,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir().join("locale-hub"),
            archive_name: "bundle-export.zip".to_string(),
            interpolation: InterpolationConfig::default(),
            features: FeaturesConfig::default(),
        }
    }
}

/// `interpolation` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterpolationConfig {
    /// Maximum nesting of `{{ key }}` references resolved for a single value.
    pub max_depth: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

/// `features` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesConfig {
    /// Push published manifests to the SDK read cache.
    pub sdk: bool,
}

impl HubSettings {
    /// # Errors
    /// - Empty work root or archive name
    /// - Archive name containing a path separator
    /// - Interpolation depth out of range
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.work_root.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "workRoot",
                "The work root cannot be empty. Example: \"/tmp/locale-hub\"",
            ));
        }

        if self.archive_name.trim().is_empty() {
            errors.push(ValidationError::new(
                "archiveName",
                "The archive name cannot be empty. Example: \"bundle-export.zip\"",
            ));
        } else if self.archive_name.contains(['/', '\\']) {
            errors.push(ValidationError::new(
                "archiveName",
                format!("'{}' must be a file name, not a path", self.archive_name),
            ));
        }

        if self.interpolation.max_depth == 0 || self.interpolation.max_depth > MAX_INTERPOLATION_DEPTH
        {
            errors.push(ValidationError::new(
                "interpolation.maxDepth",
                format!(
                    "Must be between 1 and {MAX_INTERPOLATION_DEPTH}, got {}",
                    self.interpolation.max_depth
                ),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// `self` when valid, every validation error otherwise.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        self.validate().map_err(ConfigError::ValidationErrors)?;
        Ok(self)
    }

    /// Directory holding per-generation working trees.
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.work_root.join("projects")
    }

    /// Directory holding packaged bundles of one project.
    ///
    /// `project_id` is joined as is; bundle generation checks it first.
    #[must_use]
    pub fn archives_dir(&self, project_id: &str) -> PathBuf {
        self.work_root.join("archives").join(project_id)
    }
}
