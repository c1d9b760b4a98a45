//! Working directory preparation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::bootstrap::BootstrapError;

/// Directories the demo writes into, relative to the workspace root.
pub const WORKING_DIRECTORIES: [&str; 4] = ["models", "static", "logs", "data"];

/// Fixed set of working directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    names: Vec<&'static str>,
}

impl Default for DirectorySet {
    fn default() -> Self {
        Self {
            names: WORKING_DIRECTORIES.to_vec(),
        }
    }
}

impl DirectorySet {
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Ensure every directory exists under `root`.
    ///
    /// Creation is single-level and idempotent: an existing directory is
    /// success. Any other failure, including a non-directory occupying the
    /// path, aborts.
    pub fn prepare(&self, root: &Path) -> Result<Vec<PathBuf>, BootstrapError> {
        let mut prepared = Vec::with_capacity(self.names.len());

        for name in &self.names {
            let path = root.join(name);
            match fs::create_dir(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Created directory"),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    ensure_directory(&path)?;
                }
                Err(source) => return Err(BootstrapError::Filesystem { path, source }),
            }
            prepared.push(path);
        }

        tracing::info!(root = %root.display(), "Directory structure created");
        Ok(prepared)
    }
}

fn ensure_directory(path: &Path) -> Result<(), BootstrapError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BootstrapError::Filesystem {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
        }),
        Err(source) => Err(BootstrapError::Filesystem {
            path: path.to_path_buf(),
            source,
        }),
    }
}
