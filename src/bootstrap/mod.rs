//! Bootstrap gates.
//!
//! # Data Flow
//! ```text
//! ConfigurationSet
//!     → dependencies.rs (required: abort, optional: degrade)
//!     → filesystem.rs   (models/ static/ logs/ data/)
//!     → storage.rs      (collaborator, soft-fail)
//!     → artifacts.rs    (trained model files, hard-fail)
//!     → ready to serve
//! ```
//!
//! # Design Decisions
//! - Gates never exit the process; they return `Gate` or `BootstrapError`
//! - Only the binary entry point turns an error into an exit code
//! - No retries: every gate is attempted once

pub mod artifacts;
pub mod dependencies;
pub mod filesystem;
pub mod storage;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::ServeError;

pub use artifacts::{ArtifactManifest, MODEL_ARTIFACTS};
pub use dependencies::{
    audit, Capability, CapabilityProbe, DependencyReport, Locator, ProbeError, Requirement, Resolution,
    SystemProbe, DEFAULT_CATALOG,
};
pub use filesystem::{DirectorySet, WORKING_DIRECTORIES};
pub use storage::{initialize_storage, SqliteFileStorage, StorageError, StorageInitializer, StorageStatus};

/// Outcome of a gate that did not abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Pass(T),
    /// Passed with reduced functionality.
    Degraded { value: T, reasons: Vec<String> },
}

impl<T> Gate<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Gate::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Gate::Pass(value) | Gate::Degraded { value, .. } => value,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            Gate::Pass(_) => &[],
            Gate::Degraded { reasons, .. } => reasons,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Gate::Pass(value) | Gate::Degraded { value, .. } => value,
        }
    }

    /// Split into the value and its degradation reasons.
    pub fn into_parts(self) -> (T, Vec<String>) {
        match self {
            Gate::Pass(value) => (value, Vec::new()),
            Gate::Degraded { value, reasons } => (value, reasons),
        }
    }
}

/// Fatal bootstrap failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(
        "missing required capability `{capability}` ({reason}); please install the demo requirements"
    )]
    MissingRequirement { capability: String, reason: String },

    #[error("failed to prepare {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "pre-trained models not found (missing: {}); please run the training script: python train.py",
        missing.join(", ")
    )]
    MissingArtifacts { missing: Vec<String> },

    #[error("server error: {0}")]
    Serve(#[from] ServeError),
}

impl BootstrapError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BootstrapError::Serve(_) => 1,
            BootstrapError::MissingRequirement { .. } => 2,
            BootstrapError::MissingArtifacts { .. } => 3,
            BootstrapError::Filesystem { .. } => 4,
            BootstrapError::InvalidConfig(_) => 5,
        }
    }
}
