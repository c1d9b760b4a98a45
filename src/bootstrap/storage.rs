//! Storage initialization.
//!
//! The storage backend is owned by a collaborator; this gate only invokes
//! its initialization contract once and records the outcome. Failure is
//! soft: it is logged and the sequence continues in degraded mode.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use thiserror::Error;

use crate::bootstrap::Gate;
use crate::config::ConfigurationSet;

/// Why storage could not be initialized.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("option `{0}` is not set")]
    MissingOption(&'static str),

    #[error("invalid database url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported database scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("database unusable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Contract of the storage collaborator.
pub trait StorageInitializer {
    /// Initialize storage, reporting success or a typed failure.
    fn initialize(&self, options: &ConfigurationSet) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Outcome of the storage gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageStatus {
    Ready,
    Degraded(String),
}

impl StorageStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, StorageStatus::Ready)
    }
}

/// Run the storage collaborator exactly once.
pub async fn initialize_storage<S>(storage: &S, options: &ConfigurationSet) -> Gate<StorageStatus>
where
    S: StorageInitializer + ?Sized,
{
    tracing::info!("Initializing storage");

    match storage.initialize(options).await {
        Ok(()) => {
            tracing::info!("Database initialized");
            Gate::Pass(StorageStatus::Ready)
        }
        Err(e) => {
            tracing::error!(error = %e, "Database initialization failed - some features may not work");
            let reason = e.to_string();
            Gate::Degraded {
                value: StorageStatus::Degraded(reason.clone()),
                reasons: vec![format!("storage: {reason}")],
            }
        }
    }
}

/// Default collaborator for `sqlite:` database URLs.
///
/// Connects (creating the file if missing) and reads the schema table.
/// Schema setup belongs to the service that owns the data.
#[derive(Debug, Clone)]
pub struct SqliteFileStorage {
    root: PathBuf,
}

impl SqliteFileStorage {
    /// Relative database paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the on-disk location named by `url`.
    ///
    /// `sqlite:///rel.db` is relative to the root, `sqlite:////abs.db` is
    /// absolute and `sqlite:///:memory:` has no file.
    pub fn database_path(&self, url: &str) -> Result<Option<PathBuf>, StorageError> {
        let parsed = url::Url::parse(url)?;
        if parsed.scheme() != "sqlite" {
            return Err(StorageError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let rest = url.strip_prefix("sqlite://").unwrap_or_default();
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        if rest.is_empty() || rest == ":memory:" {
            return Ok(None);
        }

        let path = Path::new(rest);
        if path.is_absolute() {
            Ok(Some(path.to_path_buf()))
        } else {
            Ok(Some(self.root.join(path)))
        }
    }
}

impl StorageInitializer for SqliteFileStorage {
    async fn initialize(&self, options: &ConfigurationSet) -> Result<(), StorageError> {
        let url = options
            .get("DATABASE_URL")
            .ok_or(StorageError::MissingOption("DATABASE_URL"))?;

        let connect_options = match self.database_path(url)? {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| StorageError::Io {
                            path: parent.to_path_buf(),
                            source,
                        })?;
                }
                tracing::debug!(path = %path.display(), "Opening database");
                SqliteConnectOptions::new().filename(&path).create_if_missing(true)
            }
            None => SqliteConnectOptions::from_str("sqlite::memory:")?,
        };

        let mut conn = connect_options.connect().await?;
        let tables: i64 = sqlx::query_scalar("SELECT count(*) FROM sqlite_master")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;

        tracing::debug!(tables, "Database reachable");
        Ok(())
    }
}
