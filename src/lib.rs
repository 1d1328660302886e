//! locale-hub-core
//!
//! Versioned translation manifests: an append-only commit log per project,
//! published snapshot resolution, `{{ key }}` interpolation and Android/iOS
//! string bundle export.

/// Android and iOS bundle export
pub mod bundle;
/// Published manifest read cache
pub mod cache;
/// Commit history and publishing
pub mod commit;
/// Hub settings
pub mod config;
/// Error types
pub mod error;
/// Snapshots, interpolation and progress
pub mod manifest;
/// Snapshot views over the commit history
pub mod resolver;
/// `LocaleHub` facade
pub mod service;

#[cfg(test)]
mod test_utils;

pub use error::{
    CoreError,
    Result,
};
pub use service::LocaleHub;
