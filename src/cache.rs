//! Notification of the low-latency read cache used by client SDKs.
//!
//! The cache mirrors the published snapshot of every project. Notifications
//! are queued to a background worker; a slow or failing cache never delays
//! the caller.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{
    RwLock,
    mpsc,
    oneshot,
};

use crate::commit::Commit;
use crate::error::Result;
use crate::manifest::Snapshot;

/// Entry stored in the cache for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedManifest {
    pub commit_id: String,
    #[serde(rename = "commit")]
    pub snapshot: Snapshot,
}

impl From<&Commit> for PublishedManifest {
    fn from(commit: &Commit) -> Self {
        Self { commit_id: commit.id.clone(), snapshot: commit.snapshot.clone() }
    }
}

/// Read cache collaborator.
#[async_trait]
pub trait PublishedManifestCache: Send + Sync + 'static {
    /// Replace the published manifest of a project; `None` clears it.
    async fn set_published(
        &self,
        project_id: &str,
        published: Option<PublishedManifest>,
    ) -> Result<()>;

    /// Forget a deleted project.
    async fn remove_project(&self, project_id: &str) -> Result<()>;
}

/// Cache used when the SDK feature is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl PublishedManifestCache for NoopCache {
    async fn set_published(&self, _: &str, _: Option<PublishedManifest>) -> Result<()> {
        Ok(())
    }

    async fn remove_project(&self, _: &str) -> Result<()> {
        Ok(())
    }
}

/// Process-local cache, handy for single node deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifestCache {
    entries: Arc<RwLock<HashMap<String, Option<PublishedManifest>>>>,
}

impl InMemoryManifestCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the project is unknown, `Some(None)` when nothing is published.
    pub async fn get(&self, project_id: &str) -> Option<Option<PublishedManifest>> {
        self.entries.read().await.get(project_id).cloned()
    }
}

#[async_trait]
impl PublishedManifestCache for InMemoryManifestCache {
    async fn set_published(
        &self,
        project_id: &str,
        published: Option<PublishedManifest>,
    ) -> Result<()> {
        self.entries.write().await.insert(project_id.to_string(), published);
        Ok(())
    }

    async fn remove_project(&self, project_id: &str) -> Result<()> {
        self.entries.write().await.remove(project_id);
        Ok(())
    }
}

/// Work item of the notifier queue.
enum CacheUpdate {
    Published { project_id: String, revision: u64, published: Option<PublishedManifest> },
    Removed { project_id: String },
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget dispatcher in front of a [`PublishedManifestCache`].
///
/// Updates go through one queue drained by a single worker task, so the
/// cache sees them in the order they were sent. A publish update older than
/// the last one applied for the same project is dropped.
#[derive(Clone, Default)]
pub struct CacheNotifier {
    /// `None` for the no-op notifier; no worker is spawned.
    sender: Option<mpsc::UnboundedSender<CacheUpdate>>,
}

impl std::fmt::Debug for CacheNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheNotifier").field("active", &self.sender.is_some()).finish()
    }
}

impl CacheNotifier {
    /// Spawn the worker feeding `cache`. Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(cache: Arc<dyn PublishedManifestCache>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(drain(cache, receiver));
        Self { sender: Some(sender) }
    }

    /// Queue the new published state of a project.
    ///
    /// `revision` is the publish revision the change was applied on.
    pub fn published_changed(
        &self,
        project_id: &str,
        revision: u64,
        published: Option<PublishedManifest>,
    ) {
        self.send(CacheUpdate::Published { project_id: project_id.to_string(), revision, published });
    }

    /// Queue the removal of a deleted project.
    pub fn project_removed(&self, project_id: &str) {
        self.send(CacheUpdate::Removed { project_id: project_id.to_string() });
    }

    /// Wait until every update queued so far has been handed to the cache.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(CacheUpdate::Flush(done));
        if self.sender.is_some() {
            let _ = wait.await;
        }
    }

    /// Hand `update` to the worker; no-op without a cache.
    fn send(&self, update: CacheUpdate) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(update).is_err() {
            tracing::warn!("Published manifest cache worker is gone, update dropped");
        }
    }
}

/// Apply queued updates one by one until every notifier is dropped.
async fn drain(
    cache: Arc<dyn PublishedManifestCache>,
    mut receiver: mpsc::UnboundedReceiver<CacheUpdate>,
) {
    let mut applied: HashMap<String, u64> = HashMap::new();

    while let Some(update) = receiver.recv().await {
        match update {
            CacheUpdate::Published { project_id, revision, published } => {
                if applied.get(&project_id).is_some_and(|last| *last > revision) {
                    tracing::debug!(%project_id, revision, "Skipping stale cache update");
                    continue;
                }
                applied.insert(project_id.clone(), revision);

                let commit_id = published.as_ref().map(|p| p.commit_id.clone());
                if let Err(e) = cache.set_published(&project_id, published).await {
                    tracing::warn!(%project_id, ?commit_id, "Failed to update published manifest cache: {e}");
                } else {
                    tracing::debug!(%project_id, ?commit_id, "Published manifest cache updated");
                }
            }
            CacheUpdate::Removed { project_id } => {
                applied.remove(&project_id);
                if let Err(e) = cache.remove_project(&project_id).await {
                    tracing::warn!(%project_id, "Failed to remove project from cache: {e}");
                }
            }
            CacheUpdate::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
