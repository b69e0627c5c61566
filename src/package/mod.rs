//! Local package inflation.
//!
//! APL documents may `import` packages by relative path. The renderer can
//! only resolve remote packages, so local ones are merged into the document
//! here before the payload leaves the process. See [`importer::inflate`].

pub mod importer;

use std::path::PathBuf;

pub use importer::inflate;

/// A local package file exists but could not be loaded.
///
/// Fatal for the whole inflation: no partially merged payload is produced.
/// Command handlers surface it as `AppError::LocalPackageImport`.
#[derive(Debug, thiserror::Error)]
#[error("error while importing local package {}: {reason}", path.display())]
pub struct LocalPackageImportError {
    /// Resolved path of the package file.
    pub path: PathBuf,
    pub reason: String,
}
