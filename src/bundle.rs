//! Android and iOS string bundles built from a published manifest.
/// Android `strings.xml` writer
pub mod android;
/// Zip packaging of a rendered bundle
pub mod archive;
/// Target formats
pub mod format;
/// Bundle pipeline
pub mod generator;
/// Key grouping into platform entries
pub mod grouping;
/// iOS `Localizable.strings` writer
pub mod ios;

pub use archive::{
    Archiver,
    ZipArchiver,
};
pub use format::BundleFormat;
pub use generator::{
    BundleGenerator,
    RenderedFile,
    render_bundle,
};
