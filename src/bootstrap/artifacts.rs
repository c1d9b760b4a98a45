//! Trained model artifact preflight.

use std::path::{Path, PathBuf};

use crate::bootstrap::BootstrapError;

/// Files the model loader needs, in load order.
pub const MODEL_ARTIFACTS: [&str; 3] = [
    "cadence_trained.pt",
    "cadence_trained_vocab.pkl",
    "cadence_trained_config.json",
];

/// Fixed set of required model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactManifest {
    files: Vec<&'static str>,
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self {
            files: MODEL_ARTIFACTS.to_vec(),
        }
    }
}

impl ArtifactManifest {
    pub fn files(&self) -> &[&'static str] {
        &self.files
    }

    /// Check that every artifact is present in `models_dir`.
    ///
    /// Presence only; contents are not inspected. Any missing file fails the
    /// whole manifest.
    pub fn verify(&self, models_dir: &Path) -> Result<Vec<PathBuf>, BootstrapError> {
        let (present, missing): (Vec<_>, Vec<_>) = self
            .files
            .iter()
            .map(|name| (*name, models_dir.join(name)))
            .partition(|(_, path)| path.is_file());

        if !missing.is_empty() {
            let missing: Vec<String> = missing.into_iter().map(|(name, _)| name.to_string()).collect();
            tracing::error!(
                models_dir = %models_dir.display(),
                missing = ?missing,
                "Pre-trained models not found, please run the training script: python train.py"
            );
            return Err(BootstrapError::MissingArtifacts { missing });
        }

        tracing::info!(models_dir = %models_dir.display(), "Pre-trained models found");
        Ok(present.into_iter().map(|(_, path)| path).collect())
    }
}
