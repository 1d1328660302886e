//! Persistence boundary for commit records.
//!
//! Records are documents keyed by project id and commit id. The store
//! supports insert, exact and by-project lookups, the field level update of
//! `published`, and the exclusive publish primitive that keeps at most one
//! published commit per project.

use async_trait::async_trait;

use super::model::Commit;
use crate::error::Result;

/// Commit persistence.
///
/// Implementations report backend failures as [`CoreError::Storage`].
///
/// [`CoreError::Storage`]: crate::error::CoreError::Storage
#[async_trait]
pub trait CommitStore: Send + Sync + 'static {
    /// Store a new commit and return it with its assigned `sequence`.
    async fn insert(&self, commit: Commit) -> Result<Commit>;

    /// Exact lookup by id.
    async fn find(&self, commit_id: &str) -> Result<Option<Commit>>;

    /// Commits of a project in creation order. Unknown projects yield `[]`.
    async fn list_by_project(&self, project_id: &str) -> Result<Vec<Commit>>;

    /// Update the flag of one commit, leaving siblings untouched.
    ///
    /// Returns `false` when the commit does not exist.
    async fn set_published(&self, commit_id: &str, published: bool) -> Result<bool>;

    /// Current publish revision of a project, bumped by every flag change.
    async fn publish_revision(&self, project_id: &str) -> Result<u64>;

    /// Clear `published` on every commit of the project and set the target's
    /// flag to `published`, as one atomic step.
    ///
    /// The write only applies when the project's publish revision still equals
    /// `expected_revision`; otherwise it fails with
    /// [`CoreError::PublishConflict`](crate::error::CoreError::PublishConflict).
    /// Returns `false` when the commit is not part of the project.
    async fn publish_exclusive(
        &self,
        project_id: &str,
        commit_id: &str,
        published: bool,
        expected_revision: u64,
    ) -> Result<bool>;

    /// Remove every commit of a project, returning how many were removed.
    async fn delete_by_project(&self, project_id: &str) -> Result<usize>;
}
