//! Startup orchestration.
//!
//! # States
//! ```text
//! Idle → EnvReady → DepsChecked → DirsReady → StorageAttempted{ok|degraded}
//!      → ArtifactsVerified → Serving → Stopped | Crashed
//! ```
//!
//! # Design Decisions
//! - Gates run strictly in order, one at a time
//! - Missing requirements and missing artifacts abort; storage failure and
//!   missing optional capabilities only degrade
//! - `Ready` is the only way to reach `serve`, and it is consumed by it

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bootstrap::{
    audit, initialize_storage, ArtifactManifest, BootstrapError, Capability, CapabilityProbe, DependencyReport,
    DirectorySet, StorageInitializer, StorageStatus, DEFAULT_CATALOG,
};
use crate::config::ConfigurationSet;
use crate::http::{ServeConfig, ServiceHost};

/// Position in the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Idle,
    EnvReady,
    DepsChecked,
    DirsReady,
    StorageAttempted { degraded: bool },
    ArtifactsVerified,
    Serving,
    Stopped,
    Crashed,
}

/// What the sequence found on its way to serving.
#[derive(Debug, Clone)]
pub struct BootReport {
    /// Every state entered, in order.
    pub trail: Vec<BootState>,
    pub dependencies: DependencyReport,
    pub directories: Vec<PathBuf>,
    pub storage: StorageStatus,
    pub artifacts: Vec<PathBuf>,
    /// Human-readable reasons for every degraded gate.
    pub degraded: Vec<String>,
}

impl BootReport {
    pub fn state(&self) -> BootState {
        self.trail.last().copied().unwrap_or(BootState::Idle)
    }

    pub fn reached(&self, state: BootState) -> bool {
        self.trail.contains(&state)
    }
}

fn enter(trail: &mut Vec<BootState>, state: BootState) {
    tracing::debug!(state = ?state, "Bootstrap state");
    trail.push(state);
}

/// Gates 2–5 over an already provisioned option table.
pub struct BootSequence<P, S> {
    options: Arc<ConfigurationSet>,
    root: PathBuf,
    catalog: Vec<Capability>,
    probe: P,
    storage: S,
    directories: DirectorySet,
    manifest: ArtifactManifest,
}

impl<P, S> BootSequence<P, S>
where
    P: CapabilityProbe,
    S: StorageInitializer,
{
    pub fn new(options: Arc<ConfigurationSet>, root: impl Into<PathBuf>, probe: P, storage: S) -> Self {
        Self {
            options,
            root: root.into(),
            catalog: DEFAULT_CATALOG.to_vec(),
            probe,
            storage,
            directories: DirectorySet::default(),
            manifest: ArtifactManifest::default(),
        }
    }

    /// Replace the capability catalog.
    pub fn catalog(mut self, catalog: Vec<Capability>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Run every gate up to the artifact check.
    pub async fn prepare(self) -> Result<Ready, BootstrapError> {
        let mut trail = vec![BootState::Idle];
        match self.run_gates(&mut trail).await {
            Ok(ready) => Ok(ready),
            Err(e) => {
                let reached = trail.last().copied().unwrap_or(BootState::Idle);
                tracing::error!(reached = ?reached, error = %e, "Bootstrap aborted");
                Err(e)
            }
        }
    }

    async fn run_gates(&self, trail: &mut Vec<BootState>) -> Result<Ready, BootstrapError> {
        tracing::info!(options = self.options.len(), "Environment configured");
        enter(trail, BootState::EnvReady);
        let mut degraded = Vec::new();

        let (dependencies, reasons) = audit(&self.catalog, &self.probe)?.into_parts();
        degraded.extend(reasons);
        enter(trail, BootState::DepsChecked);

        let directories = self.directories.prepare(&self.root)?;
        enter(trail, BootState::DirsReady);

        let (storage, reasons) = initialize_storage(&self.storage, &self.options).await.into_parts();
        degraded.extend(reasons);
        enter(
            trail,
            BootState::StorageAttempted {
                degraded: !storage.is_ready(),
            },
        );

        let artifacts = self.manifest.verify(&self.models_dir())?;
        enter(trail, BootState::ArtifactsVerified);

        if !degraded.is_empty() {
            tracing::warn!(degraded = ?degraded, "Bootstrap completed in degraded mode");
        }

        Ok(Ready {
            options: Arc::clone(&self.options),
            report: BootReport {
                trail: std::mem::take(trail),
                dependencies,
                directories,
                storage,
                artifacts,
                degraded,
            },
        })
    }
}

/// A sequence that passed every gate and may now serve.
#[derive(Debug)]
pub struct Ready {
    options: Arc<ConfigurationSet>,
    report: BootReport,
}

impl Ready {
    pub fn options(&self) -> &Arc<ConfigurationSet> {
        &self.options
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    /// Serve through `host` until `shutdown` resolves.
    ///
    /// Returns the final report on a graceful stop.
    pub async fn serve<H, F>(mut self, host: H, shutdown: F) -> Result<BootReport, BootstrapError>
    where
        H: ServiceHost,
        F: Future<Output = ()> + Send + 'static,
    {
        let config = ServeConfig::from_options(&self.options)?;
        enter(&mut self.report.trail, BootState::Serving);
        tracing::info!(address = %config.bind_address(), "Starting web server");

        match host.serve(config, shutdown).await {
            Ok(()) => {
                enter(&mut self.report.trail, BootState::Stopped);
                tracing::info!("Demo stopped");
                Ok(self.report)
            }
            Err(e) => {
                enter(&mut self.report.trail, BootState::Crashed);
                tracing::error!(error = %e, "Server error");
                Err(e.into())
            }
        }
    }
}
