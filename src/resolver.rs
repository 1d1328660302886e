//! Read side of the commit log: current and published snapshots, key history.

use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;

use crate::commit::{
    Commit,
    CommitLog,
};
use crate::error::Result;
use crate::manifest::{
    LocaleValues,
    Snapshot,
};

/// One change in the timeline of a `(locale, key)` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    /// `None` when the cell was absent or null in that commit.
    pub value: Option<String>,
}

/// Last value seen while walking the history.
#[derive(Debug, PartialEq, Eq)]
enum Seen<'a> {
    Never,
    Value(Option<&'a str>),
}

/// Read-only views of a project's snapshots.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    log: CommitLog,
}

impl ManifestResolver {
    /// Resolver reading through `log`.
    #[must_use]
    pub const fn new(log: CommitLog) -> Self {
        Self { log }
    }

    /// Snapshot of the latest commit whatever its publish state.
    ///
    /// A project without commits yields an empty snapshot.
    pub async fn get_current(&self, project_id: &str) -> Result<Snapshot> {
        let mut commits = self.log.list_by_project(project_id).await?;
        Ok(commits.pop().map(|c| c.snapshot).unwrap_or_default())
    }

    /// Snapshot of the published commit, `None` when nothing is published.
    ///
    /// Legacy data may flag several commits; the most recent one wins.
    pub async fn get_published(&self, project_id: &str) -> Result<Option<Snapshot>> {
        let published = self.log.published_commit(project_id).await?;
        if published.is_none() {
            tracing::debug!(%project_id, "No published commit");
        }
        Ok(published.map(|c| c.snapshot))
    }

    /// Values of one locale in the current snapshot.
    pub async fn get_locale(&self, project_id: &str, locale: &str) -> Result<Option<LocaleValues>> {
        let current = self.get_current(project_id).await?;
        Ok(current.locale_values(locale).cloned())
    }

    /// Snapshot carried by a specific commit of the project.
    pub async fn get_commit_snapshot(&self, project_id: &str, commit_id: &str) -> Result<Snapshot> {
        let commit = self.log.find_in_project(project_id, commit_id).await?;
        Ok(commit.snapshot)
    }

    /// Changes of one cell across the project's commits, most recent first.
    ///
    /// Only commits listing both the locale and the key take part. Within
    /// those, an absent or null cell is a value of its own.
    pub async fn get_key_history(
        &self,
        project_id: &str,
        key: &str,
        locale: &str,
    ) -> Result<Vec<HistoryEntry>> {
        let commits = self.log.list_by_project(project_id).await?;
        let history = key_history(&commits, key, locale);
        tracing::debug!(%project_id, %key, %locale, changes = history.len(), "Key history computed");
        Ok(history)
    }
}

/// Change points of one cell over `commits`, most recent first.
fn key_history(commits: &[Commit], key: &str, locale: &str) -> Vec<HistoryEntry> {
    let mut history = Vec::new();
    let mut last = Seen::Never;

    for commit in commits {
        let snapshot = &commit.snapshot;
        if !snapshot.contains_locale(locale) || !snapshot.contains_key(key) {
            continue;
        }

        let value = snapshot.value(locale, key);
        if last == Seen::Value(value) {
            continue;
        }
        last = Seen::Value(value);
        history.push(HistoryEntry { date: commit.created_at, value: value.map(str::to_string) });
    }

    history.reverse();
    history
}
