//! Append-only commit history of a project.

use std::sync::Arc;

use chrono::{
    DateTime,
    Utc,
};
use uuid::Uuid;

use super::model::{
    Commit,
    NewCommit,
};
use super::store::CommitStore;
use crate::cache::{
    CacheNotifier,
    PublishedManifest,
};
use crate::error::{
    CoreError,
    Result,
};

/// Application side of the commit history.
///
/// Owns id and timestamp assignment, delegates persistence to a
/// [`CommitStore`] and reports publish changes to the read cache.
#[derive(Clone)]
pub struct CommitLog {
    store: Arc<dyn CommitStore>,
    notifier: CacheNotifier,
}

impl std::fmt::Debug for CommitLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitLog")
            .field("store", &"<dyn CommitStore>")
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl CommitLog {
    /// Log over `store`, reporting publish changes through `notifier`.
    #[must_use]
    pub fn new(store: Arc<dyn CommitStore>, notifier: CacheNotifier) -> Self {
        Self { store, notifier }
    }

    /// Record a new unpublished commit dated now.
    pub async fn append(&self, new_commit: NewCommit) -> Result<Commit> {
        self.append_at(new_commit, Utc::now()).await
    }

    /// Record a new unpublished commit with an explicit creation date.
    ///
    /// Repeated locales or keys in the snapshot are dropped.
    pub async fn append_at(
        &self,
        new_commit: NewCommit,
        created_at: DateTime<Utc>,
    ) -> Result<Commit> {
        let NewCommit { project_id, author_id, title, description, mut snapshot } = new_commit;

        let dropped = snapshot.dedup_axes();
        if dropped > 0 {
            tracing::debug!(%project_id, dropped, "Dropped duplicate locales/keys from snapshot");
        }

        let commit = Commit {
            id: Uuid::new_v4().to_string(),
            project_id,
            author_id,
            title,
            description,
            snapshot,
            published: false,
            created_at,
            sequence: 0,
        };

        let commit = self.store.insert(commit).await?;
        tracing::info!(
            project_id = %commit.project_id,
            commit_id = %commit.id,
            locales = commit.snapshot.locales.len(),
            keys = commit.snapshot.keys.len(),
            "Commit appended"
        );

        Ok(commit)
    }

    /// Commits of a project, oldest first.
    pub async fn list_by_project(&self, project_id: &str) -> Result<Vec<Commit>> {
        let mut commits = self.store.list_by_project(project_id).await?;
        commits.sort_by_key(|c| c.sequence);
        Ok(commits)
    }

    /// Commit by id, whatever its project.
    pub async fn find(&self, commit_id: &str) -> Result<Commit> {
        self.store
            .find(commit_id)
            .await?
            .ok_or_else(|| CoreError::CommitNotFound { commit_id: commit_id.to_string() })
    }

    /// Like [`CommitLog::find`] but also requires the commit to belong to `project_id`.
    pub async fn find_in_project(&self, project_id: &str, commit_id: &str) -> Result<Commit> {
        let commit = self.find(commit_id).await?;
        if commit.project_id != project_id {
            return Err(CoreError::CommitNotFound { commit_id: commit_id.to_string() });
        }
        Ok(commit)
    }

    /// Most recently created commit flagged as published.
    pub async fn published_commit(&self, project_id: &str) -> Result<Option<Commit>> {
        let commits = self.list_by_project(project_id).await?;
        Ok(commits.into_iter().rev().find(|c| c.published))
    }

    /// Flip the flag of a single commit without touching its siblings.
    pub async fn set_published(&self, commit_id: &str, published: bool) -> Result<bool> {
        self.store.set_published(commit_id, published).await
    }

    /// Publish or unpublish `commit_id`, unpublishing every other commit of
    /// the project in the same atomic store operation.
    ///
    /// Returns `false` when the commit belongs to another project.
    ///
    /// # Errors
    /// - [`CoreError::CommitNotFound`] for an unknown commit
    /// - [`CoreError::PublishConflict`] when another publish landed first
    pub async fn publish(&self, project_id: &str, commit_id: &str, published: bool) -> Result<bool> {
        let commit = self.find(commit_id).await?;
        if commit.project_id != project_id {
            tracing::warn!(%project_id, %commit_id, "Refusing to publish a commit of another project");
            return Ok(false);
        }

        let revision = self.store.publish_revision(project_id).await?;
        let applied = self.store.publish_exclusive(project_id, commit_id, published, revision).await?;
        if !applied {
            return Ok(false);
        }

        tracing::info!(%project_id, %commit_id, published, "Publish state changed");
        let manifest = published.then(|| PublishedManifest::from(&commit));
        self.notifier.published_changed(project_id, revision, manifest);

        Ok(true)
    }

    /// Remove the whole history of a deleted project.
    pub async fn delete_project(&self, project_id: &str) -> Result<usize> {
        let removed = self.store.delete_by_project(project_id).await?;
        tracing::info!(%project_id, removed, "Project history deleted");
        self.notifier.project_removed(project_id);
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use googletest::prelude::*;

    use super::*;
    use crate::cache::InMemoryManifestCache;
    use crate::commit::InMemoryCommitStore;
    use crate::test_utils::{
        FailingStore,
        SlowFirstWrite,
        memory_log,
        new_commit,
        sample_snapshot,
    };

    async fn published_ids(log: &CommitLog, project_id: &str) -> Vec<String> {
        log.list_by_project(project_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.published)
            .map(|c| c.id)
            .collect()
    }

    #[tokio::test]
    async fn append_creates_unpublished_commit() {
        let log = memory_log();

        let commit = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        assert!(!commit.published);
        assert_eq!(commit.project_id, "p1");
        assert!(Uuid::parse_str(&commit.id).is_ok());
        assert_eq!(log.find(&commit.id).await.unwrap(), commit);
    }

    #[tokio::test]
    async fn append_drops_duplicate_axes() {
        let log = memory_log();
        let mut snapshot = sample_snapshot();
        snapshot.locales.push("en".to_string());

        let commit = log.append(new_commit("p1", snapshot)).await.unwrap();

        assert_eq!(commit.snapshot.locales, vec!["en".to_string(), "fr".to_string()]);
    }

    #[tokio::test]
    async fn append_at_keeps_given_date() {
        let log = memory_log();
        let date = Utc.with_ymd_and_hms(2021, 5, 1, 12, 0, 0).unwrap();

        let commit = log.append_at(new_commit("p1", sample_snapshot()), date).await.unwrap();

        assert_eq!(commit.created_at, date);
    }

    #[tokio::test]
    async fn list_by_project_is_in_creation_order() {
        let log = memory_log();
        let mut expected = Vec::new();
        for title in ["one", "two", "three"] {
            let mut commit = new_commit("p1", sample_snapshot());
            commit.title = title.to_string();
            expected.push(log.append(commit).await.unwrap().id);
        }
        log.append(new_commit("p2", sample_snapshot())).await.unwrap();

        let ids: Vec<String> =
            log.list_by_project("p1").await.unwrap().into_iter().map(|c| c.id).collect();

        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn list_of_unknown_project_is_empty() {
        let log = memory_log();

        assert_that!(log.list_by_project("ghost").await.unwrap(), is_empty());
    }

    #[tokio::test]
    async fn find_unknown_commit_fails() {
        let log = memory_log();

        let result = log.find("missing").await;

        assert!(matches!(result, Err(CoreError::CommitNotFound { commit_id }) if commit_id == "missing"));
    }

    #[tokio::test]
    async fn find_in_project_rejects_foreign_commit() {
        let log = memory_log();
        let commit = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        assert!(log.find_in_project("p1", &commit.id).await.is_ok());
        assert!(matches!(
            log.find_in_project("p2", &commit.id).await,
            Err(CoreError::CommitNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn publish_leaves_exactly_one_published_commit() {
        let log = memory_log();
        let first = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        let second = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        assert!(log.publish("p1", &first.id, true).await.unwrap());
        assert!(log.publish("p1", &second.id, true).await.unwrap());

        assert_eq!(published_ids(&log, "p1").await, vec![second.id.clone()]);
        assert_eq!(log.published_commit("p1").await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn unpublish_clears_every_flag() {
        let log = memory_log();
        let commit = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        log.publish("p1", &commit.id, true).await.unwrap();

        assert!(log.publish("p1", &commit.id, false).await.unwrap());

        assert!(published_ids(&log, "p1").await.is_empty());
        assert!(log.published_commit("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn publish_repairs_legacy_multi_published_state() {
        let log = memory_log();
        let a = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        let b = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        let c = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        log.set_published(&a.id, true).await.unwrap();
        log.set_published(&b.id, true).await.unwrap();

        log.publish("p1", &c.id, true).await.unwrap();

        assert_eq!(published_ids(&log, "p1").await, vec![c.id]);
    }

    #[tokio::test]
    async fn publish_of_foreign_commit_is_refused() {
        let log = memory_log();
        let foreign = log.append(new_commit("p2", sample_snapshot())).await.unwrap();

        assert!(!log.publish("p1", &foreign.id, true).await.unwrap());
        assert!(published_ids(&log, "p2").await.is_empty());
    }

    #[tokio::test]
    async fn publish_of_unknown_commit_fails() {
        let log = memory_log();

        let result = log.publish("p1", "missing", true).await;

        assert!(matches!(result, Err(CoreError::CommitNotFound { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_publishes_keep_a_single_published_commit() {
        let log = memory_log();
        let mut ids = Vec::new();
        for _ in 0..8 {
            ids.push(log.append(new_commit("p1", sample_snapshot())).await.unwrap().id);
        }

        let tasks: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let log = log.clone();
                tokio::spawn(async move { (id.clone(), log.publish("p1", &id, true).await) })
            })
            .collect();

        let mut winners = Vec::new();
        for task in tasks {
            let (id, outcome) = task.await.unwrap();
            match outcome {
                Ok(applied) => {
                    assert!(applied);
                    winners.push(id);
                }
                Err(CoreError::PublishConflict { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert!(!winners.is_empty());
        let published = published_ids(&log, "p1").await;
        assert_eq!(published.len(), 1);
        assert!(winners.contains(&published[0]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn serialized_retries_end_with_the_last_writer_published() {
        let log = memory_log();
        let mut ids = Vec::new();
        for _ in 0..6 {
            ids.push(log.append(new_commit("p1", sample_snapshot())).await.unwrap().id);
        }
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let tasks: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let log = log.clone();
                let order = Arc::clone(&order);
                tokio::spawn(async move {
                    loop {
                        let mut order = order.lock().await;
                        match log.publish("p1", &id, true).await {
                            Ok(true) => {
                                order.push(id);
                                break;
                            }
                            Err(CoreError::PublishConflict { .. }) => {}
                            other => panic!("unexpected outcome: {other:?}"),
                        }
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let order = order.lock().await;
        assert_eq!(order.len(), ids.len());
        assert_eq!(published_ids(&log, "p1").await, vec![order[order.len() - 1].clone()]);
    }

    #[tokio::test]
    async fn publish_notifies_cache_without_waiting() {
        let cache = InMemoryManifestCache::new();
        let log = CommitLog::new(
            Arc::new(InMemoryCommitStore::new()),
            CacheNotifier::new(Arc::new(cache.clone())),
        );
        let commit = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        log.publish("p1", &commit.id, true).await.unwrap();

        let mut entry = None;
        for _ in 0..50 {
            entry = cache.get("p1").await.flatten();
            if entry.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(entry.unwrap().commit_id, commit.id);
    }

    #[tokio::test]
    async fn cache_ends_on_the_last_publish_despite_a_slow_first_write() {
        let cache = Arc::new(SlowFirstWrite::default());
        let log = CommitLog::new(
            Arc::new(InMemoryCommitStore::new()),
            CacheNotifier::new(Arc::<SlowFirstWrite>::clone(&cache)),
        );
        let a = log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        let b = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        log.publish("p1", &a.id, true).await.unwrap();
        log.publish("p1", &b.id, true).await.unwrap();
        log.notifier.flush().await;

        let cached = cache.inner.get("p1").await.flatten().map(|p| p.commit_id);
        assert_eq!(cached, Some(b.id.clone()));
        assert_eq!(log.published_commit("p1").await.unwrap().map(|c| c.id), Some(b.id));
    }

    #[tokio::test]
    async fn publish_does_not_block_on_stalled_cache() {
        let log = CommitLog::new(
            Arc::new(InMemoryCommitStore::new()),
            CacheNotifier::new(Arc::new(crate::test_utils::StalledCache)),
        );
        let commit = log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        let outcome =
            tokio::time::timeout(Duration::from_secs(1), log.publish("p1", &commit.id, true)).await;

        assert!(matches!(outcome, Ok(Ok(true))));
    }

    #[tokio::test]
    async fn storage_failures_surface() {
        let log = CommitLog::new(Arc::new(FailingStore), CacheNotifier::default());

        assert!(matches!(
            log.append(new_commit("p1", sample_snapshot())).await,
            Err(CoreError::Storage(_))
        ));
        assert!(matches!(log.list_by_project("p1").await, Err(CoreError::Storage(_))));
    }

    #[tokio::test]
    async fn delete_project_drops_history() {
        let log = memory_log();
        log.append(new_commit("p1", sample_snapshot())).await.unwrap();
        log.append(new_commit("p1", sample_snapshot())).await.unwrap();

        assert_eq!(log.delete_project("p1").await.unwrap(), 2);
        assert!(log.list_by_project("p1").await.unwrap().is_empty());
    }
}
