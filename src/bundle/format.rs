//! Target platforms of a bundle.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    CoreError,
    Result,
};

/// Whether `value` can name a single directory level without leaving its parent.
///
/// Locale tags and project ids end up in bundle paths and must pass this check.
#[must_use]
pub fn is_directory_name(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\', '\0'])
}

/// Platform a bundle is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    Android,
    Ios,
}

impl BundleFormat {
    /// Location of a locale's resource file inside the bundle.
    ///
    /// # Errors
    /// [`CoreError::InvalidLocale`] when the tag is not a plain directory name.
    pub fn relative_path(self, locale: &str) -> Result<PathBuf> {
        if !is_directory_name(locale) {
            return Err(CoreError::InvalidLocale { locale: locale.to_string() });
        }

        Ok(match self {
            Self::Android => PathBuf::from(format!("values-{locale}")).join("strings.xml"),
            Self::Ios => PathBuf::from(format!("{locale}.lproj")).join("Localizable.strings"),
        })
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}
