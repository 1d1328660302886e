//! Commit records

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::manifest::Snapshot;

/// One immutable entry of a project's history.
///
/// Only `published` changes after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub project_id: String,
    pub author_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "changeList")]
    pub snapshot: Snapshot,
    #[serde(alias = "deployed", default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    /// Creation order within the store, assigned on insert.
    #[serde(default)]
    pub sequence: u64,
}

impl Commit {
    /// Metadata view without the snapshot payload.
    #[must_use]
    pub fn summary(&self) -> CommitSummary {
        CommitSummary {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            published: self.published,
            created_at: self.created_at,
        }
    }
}

/// Commit metadata shown in project details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Caller supplied part of a new commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommit {
    pub project_id: String,
    pub author_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "changeList")]
    pub snapshot: Snapshot,
}
