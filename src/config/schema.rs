//! Configuration schema definitions.
//!
//! This module defines the structure of the optional demo config file.
//! All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the demo runner.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Workspace layout (directories, storage paths are resolved against it).
    pub workspace: WorkspaceConfig,

    /// HTTP serving knobs not covered by the option table.
    pub server: ServerConfig,

    /// Capability probe settings.
    pub probe: ProbeConfig,

    /// Overrides for the provisioned option table, keyed by option name.
    pub environment: BTreeMap<String, String>,
}

/// Workspace configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root directory holding `models/`, `static/`, `logs/` and `data/`.
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Seconds to wait for in-flight requests after a shutdown signal.
    pub shutdown_grace_secs: u64,

    /// Directory served as the fallback route, relative to the workspace root.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            shutdown_grace_secs: 10,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Capability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// Extra directories searched for shared libraries.
    pub library_dirs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: DemoConfig = toml::from_str("").unwrap();
        assert_eq!(config.workspace.root, PathBuf::from("."));
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.static_dir, PathBuf::from("static"));
        assert!(config.environment.is_empty());
        assert!(config.probe.library_dirs.is_empty());
    }

    #[test]
    fn test_partial_sections() {
        let config: DemoConfig = toml::from_str(
            r#"
            [workspace]
            root = "/srv/cadence"

            [environment]
            API_PORT = "9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.workspace.root, PathBuf::from("/srv/cadence"));
        assert_eq!(config.server.shutdown_grace_secs, 10);
        assert_eq!(config.environment.get("API_PORT").map(String::as_str), Some("9000"));
    }
}
