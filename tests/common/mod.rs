//! Shared stubs for integration tests.
#![allow(dead_code)]

use std::fmt;
use std::fs;
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cadence_demo::bootstrap::{
    Capability, CapabilityProbe, ProbeError, Resolution, StorageError, StorageInitializer, MODEL_ARTIFACTS,
};
use cadence_demo::config::ConfigurationSet;
use cadence_demo::http::{ServeConfig, ServeError, ServiceHost};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer};

/// Probe that reports every capability present except the listed ones.
pub struct StubProbe {
    missing: Vec<&'static str>,
}

impl StubProbe {
    pub fn all_present() -> Self {
        Self { missing: Vec::new() }
    }

    pub fn missing(names: &[&'static str]) -> Self {
        Self {
            missing: names.to_vec(),
        }
    }
}

impl CapabilityProbe for StubProbe {
    fn resolve(&self, capability: &Capability) -> Result<Resolution, ProbeError> {
        if self.missing.contains(&capability.name) {
            Err(ProbeError::Unavailable(format!("{} is stubbed out", capability.name)))
        } else {
            Ok(Resolution::Builtin("stub"))
        }
    }
}

/// Storage collaborator with a fixed answer that counts its calls.
#[derive(Clone)]
pub struct StubStorage {
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl StubStorage {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StorageInitializer for StubStorage {
    async fn initialize(&self, _options: &ConfigurationSet) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(StorageError::Rejected("stub storage refused".into()))
        }
    }
}

/// Service host that records how it was invoked and returns at once.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<ServeConfig>>>,
    fail: bool,
}

impl RecordingHost {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ServeConfig> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceHost for RecordingHost {
    async fn serve<F>(self, config: ServeConfig, _shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.calls.lock().unwrap().push(config);
        if self.fail {
            Err(ServeError::Io(io::Error::other("listener exploded")))
        } else {
            Ok(())
        }
    }
}

/// Scratch workspace with the given model artifacts already in `models/`.
pub fn workspace(artifacts: &[&str]) -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let models = root.path().join("models");
    fs::create_dir(&models).unwrap();
    for name in artifacts {
        fs::write(models.join(name), b"artifact").unwrap();
    }
    root
}

pub fn trained_workspace() -> tempfile::TempDir {
    workspace(&MODEL_ARTIFACTS)
}

/// One captured log event.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: String,
}

impl LogRecord {
    pub fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.fields.contains(needle)
    }
}

/// Tracing layer that keeps every event in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl LogCapture {
    /// Install as the thread-local default subscriber.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    /// Like [`install`](Self::install), behind an `EnvFilter` built from
    /// `directives`.
    pub fn install_filtered(&self, directives: &str) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn at(&self, level: Level) -> Vec<LogRecord> {
        self.records().into_iter().filter(|r| r.level == level).collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = Collector::default();
        event.record(&mut collector);
        self.records.lock().unwrap().push(LogRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}

#[derive(Default)]
struct Collector {
    message: String,
    fields: String,
}

impl Visit for Collector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push_str(&format!("{}={:?} ", field.name(), value));
        }
    }
}
