//! Export of a project's published manifest as a platform bundle.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use uuid::Uuid;

use super::archive::Archiver;
use super::format::{
    BundleFormat,
    is_directory_name,
};
use super::grouping::group_locale;
use super::{
    android,
    ios,
};
use crate::config::HubSettings;
use crate::error::{
    CoreError,
    Result,
};
use crate::manifest::{
    Interpolator,
    Snapshot,
};
use crate::resolver::ManifestResolver;

/// One resource file of a bundle, relative to the bundle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Render one file per listed locale of an already interpolated snapshot.
///
/// # Errors
/// [`CoreError::InvalidLocale`] when a locale tag cannot name a directory.
pub fn render_bundle(format: BundleFormat, snapshot: &Snapshot) -> Result<Vec<RenderedFile>> {
    snapshot
        .locales
        .iter()
        .map(|locale| {
            let path = format.relative_path(locale)?;
            let entries = group_locale(snapshot, locale);
            let contents = match format {
                BundleFormat::Android => android::render(&entries),
                BundleFormat::Ios => ios::render(&entries),
            };
            Ok(RenderedFile { path, contents })
        })
        .collect()
}

/// Write rendered files below `root`, creating their directories.
async fn write_files(root: &Path, files: &[RenderedFile]) -> Result<()> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &file.contents).await?;
    }
    Ok(())
}

/// Published manifest to zip archive pipeline for one settings snapshot.
pub struct BundleGenerator {
    resolver: ManifestResolver,
    archiver: Arc<dyn Archiver>,
    interpolator: Interpolator,
    settings: HubSettings,
}

impl std::fmt::Debug for BundleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleGenerator")
            .field("archiver", &"<dyn Archiver>")
            .field("interpolator", &self.interpolator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BundleGenerator {
    /// Generator using the interpolation depth and work root of `settings`.
    #[must_use]
    pub fn new(resolver: ManifestResolver, archiver: Arc<dyn Archiver>, settings: &HubSettings) -> Self {
        Self {
            resolver,
            archiver,
            interpolator: Interpolator::new(settings.interpolation.max_depth),
            settings: settings.clone(),
        }
    }

    /// Build the bundle of the project's published manifest and return the
    /// archive location.
    ///
    /// Files are rendered into a fresh working directory which is removed on
    /// every exit path, including cancellation.
    ///
    /// # Errors
    /// - [`CoreError::InvalidProjectId`] / [`CoreError::InvalidLocale`] for names
    ///   that cannot be used as directories
    /// - [`CoreError::NoPublishedCommit`] when nothing is published
    /// - [`CoreError::CyclicReference`] / [`CoreError::DepthExceeded`] from interpolation
    /// - [`CoreError::Io`] / [`CoreError::Archive`] for filesystem and packaging failures
    pub async fn generate(&self, project_id: &str, format: BundleFormat) -> Result<PathBuf> {
        if !is_directory_name(project_id) {
            return Err(CoreError::InvalidProjectId { project_id: project_id.to_string() });
        }

        let published = self
            .resolver
            .get_published(project_id)
            .await?
            .ok_or_else(|| CoreError::NoPublishedCommit { project_id: project_id.to_string() })?;

        let resolved = self.interpolator.interpolate_snapshot(&published)?;
        let files = render_bundle(format, &resolved)?;

        let projects_dir = self.settings.projects_dir();
        tokio::fs::create_dir_all(&projects_dir).await?;
        let work_dir = tempfile::Builder::new().prefix("bundle-").tempdir_in(&projects_dir)?;
        tracing::debug!(%project_id, %format, work_dir = %work_dir.path().display(), "Rendering bundle");

        write_files(work_dir.path(), &files).await?;

        let archives_dir = self.settings.archives_dir(project_id);
        tokio::fs::create_dir_all(&archives_dir).await?;
        let generation_id = Uuid::new_v4();
        let destination =
            archives_dir.join(format!("{generation_id}-{}", self.settings.archive_name));

        let archive = self.archiver.archive(work_dir.path(), &destination).await?;

        if let Err(e) = work_dir.close() {
            tracing::warn!(%project_id, "Failed to remove bundle working directory: {e}");
        }

        tracing::info!(
            %project_id,
            %format,
            locales = files.len(),
            archive = %archive.display(),
            "Bundle generated"
        );

        Ok(archive)
    }
}
