//! Packaging of a rendered bundle directory.

use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use zip::write::SimpleFileOptions;
use zip::{
    CompressionMethod,
    ZipWriter,
};

use crate::error::{
    CoreError,
    Result,
};

/// Turns a rendered bundle tree into its downloadable artifact.
#[async_trait]
pub trait Archiver: Send + Sync + 'static {
    /// Package the contents of `source_dir` (not the directory itself) at
    /// `destination`. Parent directories of `destination` already exist.
    async fn archive(&self, source_dir: &Path, destination: &Path) -> Result<PathBuf>;
}

/// Deflated zip archive with entries named relative to the bundle root.
///
/// Entries are written in path order with `/` separators, so
/// `values-en/strings.xml` sits at the same place on every platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, source_dir: &Path, destination: &Path) -> Result<PathBuf> {
        let source = source_dir.to_path_buf();
        let target = destination.to_path_buf();

        let entries = tokio::task::spawn_blocking(move || {
            let outcome = write_zip(&source, &target);
            if outcome.is_err() {
                let _ = std::fs::remove_file(&target);
            }
            outcome
        })
        .await
        .map_err(|e| CoreError::Io(std::io::Error::other(e)))??;

        tracing::debug!(
            source = %source_dir.display(),
            destination = %destination.display(),
            entries,
            "Bundle archived"
        );

        Ok(destination.to_path_buf())
    }
}

/// Deflate every entry.
fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Write every file under `source_dir` into a new archive at `destination`.
fn write_zip(source_dir: &Path, destination: &Path) -> Result<usize> {
    let files = collect_files(source_dir)?;

    let mut writer = ZipWriter::new(File::create(destination)?);
    for relative in &files {
        writer.start_file(entry_name(relative), file_options())?;
        let mut source = File::open(source_dir.join(relative))?;
        std::io::copy(&mut source, &mut writer)?;
    }
    writer.finish()?;

    Ok(files.len())
}

/// Regular files under `root`, relative to it and sorted.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        for entry in std::fs::read_dir(root.join(&relative))? {
            let entry = entry?;
            let path = relative.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Archive entry name of a relative path, `/` separated.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
