//! Error types reported by the module scan.
//!
//! Neither variant is ever returned to the caller of a scan. Both travel
//! inside [`LoadOutcome`](crate::LoadOutcome) values and are logged where the
//! walk encounters them.

use std::path::{Path, PathBuf};

/// A recoverable failure for one candidate path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    /// A configured path (or an entry found while walking) does not exist
    #[error("Module path \"{}\" not found", .0.display())]
    PathNotFound(PathBuf),
    /// The dynamic-loading facility rejected the candidate
    #[error("Failed to load module \"{}\": {reason}", path.display())]
    LoadFailed {
        /// The candidate that could not be loaded
        path: PathBuf,
        /// Text reported by the loading facility
        reason: String,
    },
}

impl ModuleError {
    /// Build a [`ModuleError::LoadFailed`] from any path and reason text
    pub fn load_failed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::PathNotFound(path) => path,
            Self::LoadFailed { path, .. } => path,
        }
    }
}
