//! Entry point used by the request layer.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::RwLock;

use crate::bundle::{
    Archiver,
    BundleFormat,
    BundleGenerator,
    ZipArchiver,
};
use crate::cache::{
    CacheNotifier,
    NoopCache,
    PublishedManifestCache,
};
use crate::commit::{
    Commit,
    CommitLog,
    CommitStore,
    CommitSummary,
    InMemoryCommitStore,
    NewCommit,
};
use crate::config::HubSettings;
use crate::error::Result;
use crate::manifest::{
    LocaleValues,
    ProjectProgress,
    Snapshot,
    locale_progress,
    project_progress,
};
use crate::resolver::{
    HistoryEntry,
    ManifestResolver,
};

/// Translation hub over injected storage, cache and archiver.
///
/// Clones share the same log, cache worker and settings.
#[derive(Clone)]
pub struct LocaleHub {
    log: CommitLog,
    resolver: ManifestResolver,
    archiver: Arc<dyn Archiver>,
    /// Validated settings; replaced as a whole by [`LocaleHub::update_settings`].
    settings: Arc<RwLock<HubSettings>>,
}

impl std::fmt::Debug for LocaleHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleHub")
            .field("log", &self.log)
            .field("archiver", &"<dyn Archiver>")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LocaleHub {
    /// Wire a hub. The cache is only notified when `features.sdk` is enabled
    /// in `settings`; later updates do not change that choice.
    ///
    /// Must be called within a Tokio runtime when the SDK feature is on.
    ///
    /// # Errors
    /// [`CoreError::Config`](crate::error::CoreError::Config) when `settings` are invalid.
    pub fn new(
        store: Arc<dyn CommitStore>,
        cache: Arc<dyn PublishedManifestCache>,
        archiver: Arc<dyn Archiver>,
        settings: HubSettings,
    ) -> Result<Self> {
        let settings = settings.into_validated()?;
        let notifier = if settings.features.sdk {
            CacheNotifier::new(cache)
        } else {
            tracing::debug!("SDK feature disabled, published manifest cache is not notified");
            CacheNotifier::default()
        };
        let log = CommitLog::new(store, notifier);

        Ok(Self {
            resolver: ManifestResolver::new(log.clone()),
            log,
            archiver,
            settings: Arc::new(RwLock::new(settings)),
        })
    }

    /// Process-local hub: in-memory store, no cache, zip archives.
    pub fn in_memory(settings: HubSettings) -> Result<Self> {
        Self::new(
            Arc::new(InMemoryCommitStore::new()),
            Arc::new(NoopCache),
            Arc::new(ZipArchiver),
            settings,
        )
    }

    /// Current settings.
    pub async fn settings(&self) -> HubSettings {
        self.settings.read().await.clone()
    }

    /// Replace the settings; invalid settings leave the current ones in place.
    pub async fn update_settings(&self, settings: HubSettings) -> Result<()> {
        let settings = settings.into_validated()?;
        *self.settings.write().await = settings;
        tracing::debug!("Settings updated");
        Ok(())
    }

    /// Record a new unpublished commit.
    pub async fn append_commit(&self, new_commit: NewCommit) -> Result<Commit> {
        self.log.append(new_commit).await
    }

    /// Commit metadata of a project, oldest first.
    pub async fn list_commits(&self, project_id: &str) -> Result<Vec<CommitSummary>> {
        let commits = self.log.list_by_project(project_id).await?;
        Ok(commits.iter().map(Commit::summary).collect())
    }

    /// One commit of the project, with its snapshot.
    pub async fn get_commit(&self, project_id: &str, commit_id: &str) -> Result<Commit> {
        self.log.find_in_project(project_id, commit_id).await
    }

    /// Snapshot of the latest commit, published or not.
    pub async fn get_current_manifest(&self, project_id: &str) -> Result<Snapshot> {
        self.resolver.get_current(project_id).await
    }

    /// Snapshot clients see, `None` when nothing is published.
    pub async fn get_published_manifest(&self, project_id: &str) -> Result<Option<Snapshot>> {
        self.resolver.get_published(project_id).await
    }

    /// One locale of the current snapshot.
    pub async fn get_locale_manifest(
        &self,
        project_id: &str,
        locale: &str,
    ) -> Result<Option<LocaleValues>> {
        self.resolver.get_locale(project_id, locale).await
    }

    /// Changes of one cell, most recent first.
    pub async fn get_key_history(
        &self,
        project_id: &str,
        key: &str,
        locale: &str,
    ) -> Result<Vec<HistoryEntry>> {
        self.resolver.get_key_history(project_id, key, locale).await
    }

    /// Publish or unpublish a commit, keeping at most one published per project.
    pub async fn set_publish_state(
        &self,
        project_id: &str,
        commit_id: &str,
        published: bool,
    ) -> Result<bool> {
        self.log.publish(project_id, commit_id, published).await
    }

    /// Export the published manifest in `format` (`android` or `ios`).
    pub async fn generate_bundle(&self, project_id: &str, format: &str) -> Result<PathBuf> {
        let format: BundleFormat = format.parse()?;
        let settings = self.settings().await;
        let generator =
            BundleGenerator::new(self.resolver.clone(), Arc::clone(&self.archiver), &settings);

        generator.generate(project_id, format).await
    }

    /// Completion of the project's current snapshot.
    pub async fn project_progress(&self, project_id: &str) -> Result<ProjectProgress> {
        let current = self.resolver.get_current(project_id).await?;
        Ok(ProjectProgress {
            project_id: project_id.to_string(),
            progress: project_progress(&current),
        })
    }

    /// Completion per locale of the project's current snapshot.
    pub async fn locale_progress(&self, project_id: &str) -> Result<Option<BTreeMap<String, f64>>> {
        let current = self.resolver.get_current(project_id).await?;
        Ok(locale_progress(&current))
    }

    /// Progress of several projects, computed concurrently.
    pub async fn projects_progress(&self, project_ids: &[String]) -> Result<Vec<ProjectProgress>> {
        join_all(project_ids.iter().map(|id| self.project_progress(id)))
            .await
            .into_iter()
            .collect()
    }

    /// Drop the history of a deleted project.
    pub async fn delete_project(&self, project_id: &str) -> Result<usize> {
        self.log.delete_project(project_id).await
    }
}
