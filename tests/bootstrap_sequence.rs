//! Gate ordering and failure policy of the bootstrap sequence.

use std::sync::Arc;

use cadence_demo::bootstrap::{BootstrapError, WORKING_DIRECTORIES};
use cadence_demo::config::ConfigurationSet;
use cadence_demo::lifecycle::{BootSequence, BootState, Shutdown};
use cadence_demo::ServeConfig;
use tracing::Level;

mod common;

use common::{LogCapture, RecordingHost, StubProbe, StubStorage};

const REQUIRED: [&str; 8] = [
    "tensor-runtime",
    "numeric-arrays",
    "tabular-data",
    "classical-ml",
    "web-framework",
    "http-server",
    "structured-logging",
    "sql-toolkit",
];

fn options() -> Arc<ConfigurationSet> {
    Arc::new(ConfigurationSet::defaults())
}

#[tokio::test]
async fn test_missing_requirement_stops_before_storage() {
    for capability in REQUIRED {
        let root = common::trained_workspace();
        let storage = StubStorage::succeeding();

        let err = BootSequence::new(options(), root.path(), StubProbe::missing(&[capability]), storage.clone())
            .prepare()
            .await
            .unwrap_err();

        assert!(
            matches!(err, BootstrapError::MissingRequirement { capability: ref name, .. } if name == capability),
            "{capability}: {err}"
        );
        assert_ne!(err.exit_code(), 0);
        assert_eq!(storage.calls(), 0, "{capability}: storage must not be attempted");
    }
}

#[tokio::test]
async fn test_missing_optional_capabilities_degrade_with_warnings() {
    let capture = LogCapture::default();
    let _guard = capture.install();

    let root = common::trained_workspace();
    let ready = BootSequence::new(
        options(),
        root.path(),
        StubProbe::missing(&["cache-client", "datasets"]),
        StubStorage::succeeding(),
    )
    .prepare()
    .await
    .unwrap();

    let report = ready.report();
    assert!(report.reached(BootState::DepsChecked));
    assert_eq!(report.dependencies.missing_optional, vec!["cache-client", "datasets"]);
    assert_eq!(report.degraded.len(), 2);

    let warnings = capture.at(Level::WARN);
    for capability in ["cache-client", "datasets"] {
        assert!(
            warnings.iter().any(|record| record.mentions(capability)),
            "no degraded-mode warning for {capability}: {warnings:?}"
        );
    }
}

#[tokio::test]
async fn test_directories_are_prepared_idempotently() {
    let root = common::trained_workspace();

    for _ in 0..2 {
        BootSequence::new(options(), root.path(), StubProbe::all_present(), StubStorage::succeeding())
            .prepare()
            .await
            .unwrap();
    }

    for name in WORKING_DIRECTORIES {
        assert!(root.path().join(name).is_dir(), "{name}");
    }
}

#[tokio::test]
async fn test_storage_failure_still_reaches_artifact_check() {
    // No artifacts: reaching the artifact gate shows up as its error.
    let root = common::workspace(&[]);
    let storage = StubStorage::failing();

    let err = BootSequence::new(options(), root.path(), StubProbe::all_present(), storage.clone())
        .prepare()
        .await
        .unwrap_err();

    assert_eq!(storage.calls(), 1);
    assert!(matches!(err, BootstrapError::MissingArtifacts { .. }), "{err}");
}

#[tokio::test]
async fn test_storage_failure_is_soft() {
    let root = common::trained_workspace();
    let storage = StubStorage::failing();

    let ready = BootSequence::new(options(), root.path(), StubProbe::all_present(), storage.clone())
        .prepare()
        .await
        .unwrap();

    let report = ready.report();
    assert_eq!(storage.calls(), 1);
    assert!(!report.storage.is_ready());
    assert!(report.reached(BootState::StorageAttempted { degraded: true }));
    assert_eq!(report.state(), BootState::ArtifactsVerified);
}

#[tokio::test]
async fn test_missing_vocabulary_aborts_before_serving() {
    let root = common::workspace(&["cadence_trained.pt", "cadence_trained_config.json"]);
    let host = RecordingHost::default();

    let result = BootSequence::new(options(), root.path(), StubProbe::all_present(), StubStorage::succeeding())
        .prepare()
        .await;

    let err = result.unwrap_err();
    match &err {
        BootstrapError::MissingArtifacts { missing } => {
            assert_eq!(missing, &vec!["cadence_trained_vocab.pkl".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("pre-trained models not found"));
    assert_ne!(err.exit_code(), 0);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_end_to_end_serves_exactly_once() {
    let root = common::trained_workspace();
    let host = RecordingHost::default();
    let shutdown = Shutdown::new();

    let ready = BootSequence::new(options(), root.path(), StubProbe::all_present(), StubStorage::succeeding())
        .prepare()
        .await
        .unwrap();
    let report = ready.serve(host.clone(), shutdown.signalled()).await.unwrap();

    assert_eq!(
        host.calls(),
        vec![ServeConfig {
            host: "0.0.0.0".into(),
            port: 8000,
            log_level: "info".into(),
            reload: false,
            access_log: true,
        }]
    );
    assert_eq!(
        report.trail,
        vec![
            BootState::Idle,
            BootState::EnvReady,
            BootState::DepsChecked,
            BootState::DirsReady,
            BootState::StorageAttempted { degraded: false },
            BootState::ArtifactsVerified,
            BootState::Serving,
            BootState::Stopped,
        ]
    );
    assert!(report.degraded.is_empty());
}

#[tokio::test]
async fn test_server_error_is_fatal() {
    let root = common::trained_workspace();
    let host = RecordingHost::failing();

    let ready = BootSequence::new(options(), root.path(), StubProbe::all_present(), StubStorage::succeeding())
        .prepare()
        .await
        .unwrap();
    let err = ready.serve(host.clone(), Shutdown::new().signalled()).await.unwrap_err();

    assert!(matches!(err, BootstrapError::Serve(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(host.calls().len(), 1);
}

#[tokio::test]
async fn test_builtin_only_catalog_passes_with_system_probe() {
    use cadence_demo::bootstrap::{SystemProbe, DEFAULT_CATALOG};

    let root = common::trained_workspace();
    let catalog = DEFAULT_CATALOG
        .iter()
        .copied()
        .filter(|c| {
            matches!(
                c.locator,
                cadence_demo::bootstrap::Locator::Builtin { .. } | cadence_demo::bootstrap::Locator::Native
            )
        })
        .collect::<Vec<_>>();

    let ready = BootSequence::new(options(), root.path(), SystemProbe::default(), StubStorage::succeeding())
        .catalog(catalog)
        .prepare()
        .await
        .unwrap();

    assert_eq!(ready.report().dependencies.required.len(), 7);
    assert!(ready.report().degraded.is_empty());
}
