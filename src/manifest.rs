//! Manifest model and the computations that only need one snapshot.
/// `{{ key }}` placeholder resolution
pub mod interpolation;
/// Completion ratios
pub mod progress;
/// Snapshot data structure
pub mod snapshot;

pub use interpolation::Interpolator;
pub use progress::{
    ProjectProgress,
    locale_progress,
    project_progress,
};
pub use snapshot::{
    LocaleValues,
    Snapshot,
};
