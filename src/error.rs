//! Error types shared by the store, resolver and bundle pipeline.

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias used across the crate.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Failures surfaced to the request layer.
///
/// Every variant carries enough identifiers to render a user facing message.
/// An absent published manifest is not an error and is reported as `Ok(None)`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Could not find project {project_id}")]
    ProjectNotFound { project_id: String },

    #[error("Could not find commit {commit_id}")]
    CommitNotFound { commit_id: String },

    #[error("Project {project_id} has no published commit")]
    NoPublishedCommit { project_id: String },

    #[error("File format {0} is not supported.")]
    UnsupportedFormat(String),

    #[error("Cyclic reference while resolving '{key}' in locale '{locale}': {}", chain.join(" -> "))]
    CyclicReference { locale: String, key: String, chain: Vec<String> },

    #[error("Resolving '{key}' in locale '{locale}' exceeded the maximum depth of {max_depth}")]
    DepthExceeded { locale: String, key: String, max_depth: usize },

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Concurrent publish detected on project {project_id} while publishing commit {commit_id}")]
    PublishConflict { project_id: String, commit_id: String },

    #[error("Locale '{locale}' cannot be used as a bundle directory name")]
    InvalidLocale { locale: String },

    #[error("Project id '{project_id}' cannot be used as a directory name")]
    InvalidProjectId { project_id: String },

    #[error("Bundle I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bundle archive failure: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CoreError {
    /// Stable machine readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound { .. } => "project_not_found",
            Self::CommitNotFound { .. } => "commit_not_found",
            Self::NoPublishedCommit { .. } => "commit_not_published",
            Self::UnsupportedFormat(_) => "bundle_format_unsupported",
            Self::CyclicReference { .. } | Self::DepthExceeded { .. } => {
                "manifest_interpolation_failed"
            }
            Self::InvalidLocale { .. } => "bundle_locale_invalid",
            Self::InvalidProjectId { .. } => "project_id_invalid",
            Self::Storage(_) | Self::Io(_) | Self::Archive(_) | Self::Config(_) => "server_error",
            Self::PublishConflict { .. } => "commit_cannot_publish",
        }
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::format(CoreError::UnsupportedFormat("web".to_string()), "File format web is not supported.")]
    #[case::commit(
        CoreError::CommitNotFound { commit_id: "c1".to_string() },
        "Could not find commit c1"
    )]
    #[case::cycle(
        CoreError::CyclicReference {
            locale: "en".to_string(),
            key: "a".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        },
        "Cyclic reference while resolving 'a' in locale 'en': a -> b -> a"
    )]
    fn display_names_the_context(#[case] error: CoreError, #[case] expected: &str) {
        assert_that!(error.to_string(), eq(expected));
    }

    #[googletest::test]
    fn codes_group_interpolation_failures() {
        let cycle = CoreError::CyclicReference {
            locale: "en".to_string(),
            key: "a".to_string(),
            chain: Vec::new(),
        };
        let depth =
            CoreError::DepthExceeded { locale: "en".to_string(), key: "a".to_string(), max_depth: 2 };

        expect_that!(cycle.code(), eq(depth.code()));
        expect_that!(CoreError::Storage("down".to_string()).code(), eq("server_error"));
        expect_that!(
            CoreError::InvalidLocale { locale: "../x".to_string() }.code(),
            eq("bundle_locale_invalid")
        );
    }
}
