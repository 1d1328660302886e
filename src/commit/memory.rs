//! In-process commit store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::Commit;
use super::store::CommitStore;
use crate::error::{
    CoreError,
    Result,
};

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct Records {
    /// Insertion ordered; `sequence` grows with the position.
    commits: Vec<Commit>,
    /// Publish revision per project.
    revisions: HashMap<String, u64>,
    next_sequence: u64,
}

impl Records {
    /// Record a flag change on the project.
    fn bump_revision(&mut self, project_id: &str) {
        *self.revisions.entry(project_id.to_string()).or_insert(0) += 1;
    }
}

/// Commit store backed by a vector behind a `RwLock`.
///
/// Every write happens under the write lock, so `publish_exclusive` clears
/// siblings and flags the target without any observable intermediate state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCommitStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryCommitStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommitStore for InMemoryCommitStore {
    async fn insert(&self, mut commit: Commit) -> Result<Commit> {
        let mut records = self.records.write().await;

        if records.commits.iter().any(|c| c.id == commit.id) {
            return Err(CoreError::Storage(format!("Duplicate commit id {}", commit.id)));
        }

        commit.sequence = records.next_sequence;
        records.next_sequence += 1;
        records.commits.push(commit.clone());

        Ok(commit)
    }

    async fn find(&self, commit_id: &str) -> Result<Option<Commit>> {
        let records = self.records.read().await;
        Ok(records.commits.iter().find(|c| c.id == commit_id).cloned())
    }

    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Commit>> {
        let records = self.records.read().await;
        Ok(records.commits.iter().filter(|c| c.project_id == project_id).cloned().collect())
    }

    async fn set_published(&self, commit_id: &str, published: bool) -> Result<bool> {
        let mut records = self.records.write().await;

        let Some(commit) = records.commits.iter_mut().find(|c| c.id == commit_id) else {
            return Ok(false);
        };
        commit.published = published;
        let project_id = commit.project_id.clone();
        records.bump_revision(&project_id);

        Ok(true)
    }

    async fn publish_revision(&self, project_id: &str) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.revisions.get(project_id).copied().unwrap_or(0))
    }

    async fn publish_exclusive(
        &self,
        project_id: &str,
        commit_id: &str,
        published: bool,
        expected_revision: u64,
    ) -> Result<bool> {
        let mut records = self.records.write().await;

        let current = records.revisions.get(project_id).copied().unwrap_or(0);
        if current != expected_revision {
            return Err(CoreError::PublishConflict {
                project_id: project_id.to_string(),
                commit_id: commit_id.to_string(),
            });
        }

        if !records.commits.iter().any(|c| c.id == commit_id && c.project_id == project_id) {
            return Ok(false);
        }

        for commit in records.commits.iter_mut().filter(|c| c.project_id == project_id) {
            commit.published = published && commit.id == commit_id;
        }
        records.bump_revision(project_id);

        Ok(true)
    }

    async fn delete_by_project(&self, project_id: &str) -> Result<usize> {
        let mut records = self.records.write().await;

        let before = records.commits.len();
        records.commits.retain(|c| c.project_id != project_id);
        records.revisions.remove(project_id);

        Ok(before - records.commits.len())
    }
}
