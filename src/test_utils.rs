//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::cache::{
    CacheNotifier,
    InMemoryManifestCache,
    PublishedManifest,
    PublishedManifestCache,
};
use crate::commit::{
    Commit,
    CommitLog,
    CommitStore,
    InMemoryCommitStore,
    NewCommit,
};
use crate::error::{
    CoreError,
    Result,
};
use crate::manifest::Snapshot;

/// Two locales, two keys, one gap.
pub(crate) fn sample_snapshot() -> Snapshot {
    Snapshot::new(["en", "fr"], ["hello", "bye"])
        .with_value("en", "hello", "Hello")
        .with_value("en", "bye", "Bye")
        .with_value("fr", "hello", "Bonjour")
}

pub(crate) fn new_commit(project_id: &str, snapshot: Snapshot) -> NewCommit {
    NewCommit {
        project_id: project_id.to_string(),
        author_id: "author".to_string(),
        title: "Update translations".to_string(),
        description: None,
        snapshot,
    }
}

/// Unpublished commit with a fixed id, ready for direct store insertion.
pub(crate) fn commit_fixture(id: &str, project_id: &str) -> Commit {
    Commit {
        id: id.to_string(),
        project_id: project_id.to_string(),
        author_id: "author".to_string(),
        title: format!("Commit {id}"),
        description: None,
        snapshot: sample_snapshot(),
        published: false,
        created_at: Utc::now(),
        sequence: 0,
    }
}

/// Commit log over a fresh in-memory store and no cache.
pub(crate) fn memory_log() -> CommitLog {
    CommitLog::new(Arc::new(InMemoryCommitStore::new()), CacheNotifier::default())
}

/// Store whose every call fails.
pub(crate) struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(CoreError::Storage("store unavailable".to_string()))
}

#[async_trait]
impl CommitStore for FailingStore {
    async fn insert(&self, _: Commit) -> Result<Commit> {
        unavailable()
    }

    async fn find(&self, _: &str) -> Result<Option<Commit>> {
        unavailable()
    }

    async fn list_by_project(&self, _: &str) -> Result<Vec<Commit>> {
        unavailable()
    }

    async fn set_published(&self, _: &str, _: bool) -> Result<bool> {
        unavailable()
    }

    async fn publish_revision(&self, _: &str) -> Result<u64> {
        unavailable()
    }

    async fn publish_exclusive(&self, _: &str, _: &str, _: bool, _: u64) -> Result<bool> {
        unavailable()
    }

    async fn delete_by_project(&self, _: &str) -> Result<usize> {
        unavailable()
    }
}

/// Cache that never answers.
pub(crate) struct StalledCache;

#[async_trait]
impl PublishedManifestCache for StalledCache {
    async fn set_published(&self, _: &str, _: Option<PublishedManifest>) -> Result<()> {
        std::future::pending().await
    }

    async fn remove_project(&self, _: &str) -> Result<()> {
        std::future::pending().await
    }
}

/// Delays its first write, then behaves like [`InMemoryManifestCache`].
#[derive(Default)]
pub(crate) struct SlowFirstWrite {
    pub(crate) inner: InMemoryManifestCache,
    delayed: AtomicBool,
}

#[async_trait]
impl PublishedManifestCache for SlowFirstWrite {
    async fn set_published(&self, project_id: &str, published: Option<PublishedManifest>) -> Result<()> {
        if !self.delayed.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.inner.set_published(project_id, published).await
    }

    async fn remove_project(&self, project_id: &str) -> Result<()> {
        self.inner.remove_project(project_id).await
    }
}

/// Contents of one entry of a zip archive.
pub(crate) fn zip_entry(archive: &Path, name: &str) -> String {
    let file = std::fs::File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut contents = String::new();
    zip.by_name(name).unwrap().read_to_string(&mut contents).unwrap();
    contents
}
