//! Runtime capability auditing.
//!
//! # Responsibilities
//! - Resolve every required capability, aborting on the first missing one
//! - Resolve optional capabilities, recording degraded modes
//! - Emit one log line per check
//!
//! # Design Decisions
//! - Resolution goes through [`CapabilityProbe`] so gates can be tested
//!   against stubs
//! - Capabilities compiled into this binary resolve unconditionally

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bootstrap::{BootstrapError, Gate};

/// Whether a capability's absence is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    /// Absence is tolerated; `degraded` describes what stops working.
    Optional { degraded: &'static str },
}

/// Where a capability is expected to be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Linked into this binary by the named crate.
    Builtin { provider: &'static str },
    /// Needs no external component in this build.
    Native,
    /// A shared library, `lib<name>.so` / `lib<name>.dylib` / `<name>.dll`.
    /// `hint_var` names an environment variable pointing at an install
    /// prefix whose `lib/` is searched first.
    Library {
        name: &'static str,
        hint_var: Option<&'static str>,
    },
    /// An executable on `PATH`.
    Executable { name: &'static str },
}

/// A named runtime capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub requirement: Requirement,
    pub locator: Locator,
}

impl Capability {
    pub const fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required)
    }
}

const fn builtin(name: &'static str, provider: &'static str) -> Capability {
    Capability {
        name,
        requirement: Requirement::Required,
        locator: Locator::Builtin { provider },
    }
}

const fn native(name: &'static str) -> Capability {
    Capability {
        name,
        requirement: Requirement::Required,
        locator: Locator::Native,
    }
}

/// Capabilities the demo service needs.
pub const DEFAULT_CATALOG: &[Capability] = &[
    Capability {
        name: "tensor-runtime",
        requirement: Requirement::Required,
        locator: Locator::Library {
            name: "torch",
            hint_var: Some("LIBTORCH"),
        },
    },
    native("numeric-arrays"),
    native("tabular-data"),
    native("classical-ml"),
    builtin("web-framework", "axum"),
    builtin("http-server", "hyper"),
    builtin("structured-logging", "tracing"),
    builtin("sql-toolkit", "sqlx"),
    Capability {
        name: "cache-client",
        requirement: Requirement::Optional {
            degraded: "caching will be disabled",
        },
        locator: Locator::Library {
            name: "hiredis",
            hint_var: None,
        },
    },
    Capability {
        name: "datasets",
        requirement: Requirement::Optional {
            degraded: "synthetic data will be used",
        },
        locator: Locator::Library {
            name: "arrow",
            hint_var: Some("ARROW_HOME"),
        },
    },
];

/// Where a capability was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Builtin(&'static str),
    Native,
    Found(PathBuf),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Builtin(provider) => write!(f, "built in ({provider})"),
            Resolution::Native => f.write_str("no external component needed"),
            Resolution::Found(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Why a capability could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("{kind} `{name}` not found in {searched} search directories")]
    NotFound {
        kind: &'static str,
        name: &'static str,
        searched: usize,
    },

    #[error("{0}")]
    Unavailable(String),
}

/// Resolves capabilities against some environment.
pub trait CapabilityProbe {
    fn resolve(&self, capability: &Capability) -> Result<Resolution, ProbeError>;
}

const SYSTEM_LIBRARY_DIRS: &[&str] = &[
    "/usr/local/lib",
    "/usr/lib",
    "/usr/lib64",
    "/usr/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
    "/opt/homebrew/lib",
];

/// Probe that searches the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    library_dirs: Vec<PathBuf>,
    path_dirs: Vec<PathBuf>,
}

impl SystemProbe {
    pub fn new(library_dirs: Vec<PathBuf>, path_dirs: Vec<PathBuf>) -> Self {
        Self {
            library_dirs,
            path_dirs,
        }
    }

    /// Build a probe from the loader search path, `PATH`, and `extra`
    /// library directories (searched first).
    pub fn from_env(extra: &[PathBuf]) -> Self {
        let mut library_dirs = extra.to_vec();
        for var in ["LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH"] {
            if let Some(value) = env::var_os(var) {
                library_dirs.extend(env::split_paths(&value));
            }
        }
        library_dirs.extend(SYSTEM_LIBRARY_DIRS.iter().map(PathBuf::from));

        let path_dirs = env::var_os("PATH")
            .map(|value| env::split_paths(&value).collect())
            .unwrap_or_default();

        Self::new(library_dirs, path_dirs)
    }

    fn find_library(&self, name: &'static str, hint_var: Option<&str>) -> Result<PathBuf, ProbeError> {
        let hinted = hint_var
            .and_then(env::var_os)
            .map(|prefix| PathBuf::from(prefix).join("lib"));
        let dirs: Vec<&Path> = hinted
            .iter()
            .map(PathBuf::as_path)
            .chain(self.library_dirs.iter().map(PathBuf::as_path))
            .collect();

        for dir in &dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                if is_library_file(&file_name.to_string_lossy(), name) {
                    return Ok(entry.path());
                }
            }
        }

        Err(ProbeError::NotFound {
            kind: "shared library",
            name,
            searched: dirs.len(),
        })
    }

    fn find_executable(&self, name: &'static str) -> Result<PathBuf, ProbeError> {
        let file_name = if cfg!(windows) {
            format!("{name}.exe")
        } else {
            name.to_string()
        };

        self.path_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or(ProbeError::NotFound {
                kind: "executable",
                name,
                searched: self.path_dirs.len(),
            })
    }
}

impl CapabilityProbe for SystemProbe {
    fn resolve(&self, capability: &Capability) -> Result<Resolution, ProbeError> {
        match capability.locator {
            Locator::Builtin { provider } => Ok(Resolution::Builtin(provider)),
            Locator::Native => Ok(Resolution::Native),
            Locator::Library { name, hint_var } => {
                self.find_library(name, hint_var).map(Resolution::Found)
            }
            Locator::Executable { name } => self.find_executable(name).map(Resolution::Found),
        }
    }
}

fn is_library_file(file_name: &str, name: &str) -> bool {
    let stem = format!("lib{name}");
    let Some(rest) = file_name.strip_prefix(&stem) else {
        return file_name == format!("{name}.dll");
    };
    rest == ".so"
        || rest.starts_with(".so.")
        || rest == ".dylib"
        || (rest.starts_with('.') && rest.ends_with(".dylib"))
}

/// Capabilities confirmed present on this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
    pub missing_optional: Vec<&'static str>,
}

/// Audit `catalog` against `probe`.
///
/// Returns `Degraded` when any optional capability is missing and aborts
/// with [`BootstrapError::MissingRequirement`] on the first missing
/// required one.
pub fn audit<P>(catalog: &[Capability], probe: &P) -> Result<Gate<DependencyReport>, BootstrapError>
where
    P: CapabilityProbe + ?Sized,
{
    tracing::info!(capabilities = catalog.len(), "Checking dependencies");

    let mut report = DependencyReport::default();

    for capability in catalog.iter().filter(|c| c.is_required()) {
        match probe.resolve(capability) {
            Ok(resolution) => {
                tracing::info!(
                    capability = capability.name,
                    location = %resolution,
                    "Required capability found"
                );
                report.required.push(capability.name);
            }
            Err(e) => {
                tracing::error!(
                    capability = capability.name,
                    error = %e,
                    "Missing required capability, please install the demo requirements"
                );
                return Err(BootstrapError::MissingRequirement {
                    capability: capability.name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut reasons = Vec::new();
    for capability in catalog {
        let Requirement::Optional { degraded } = capability.requirement else {
            continue;
        };
        match probe.resolve(capability) {
            Ok(resolution) => {
                tracing::info!(
                    capability = capability.name,
                    location = %resolution,
                    "Optional capability found"
                );
                report.optional.push(capability.name);
            }
            Err(e) => {
                tracing::warn!(
                    capability = capability.name,
                    error = %e,
                    "Optional capability not available - {degraded}"
                );
                report.missing_optional.push(capability.name);
                reasons.push(format!("{}: {degraded}", capability.name));
            }
        }
    }

    if reasons.is_empty() {
        Ok(Gate::Pass(report))
    } else {
        Ok(Gate::Degraded {
            value: report,
            reasons,
        })
    }
}
