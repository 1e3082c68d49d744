//! Integration tests for the engine lifecycle

use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{sleep, timeout};

use vigil_monitor::{
    config::MonitorConfig,
    engine::{EngineStatus, MonitorEngine},
    recommend, report,
    store::{MetricHistory, MetricKind},
};

/// Create a test configuration writing artifacts into a temporary directory
///
/// The endpoint points at a freshly closed local port, so probes fail fast
/// with connection refused instead of hanging.
async fn create_test_config() -> (MonitorConfig, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = MonitorConfig::default();
    config.endpoint.url = format!("http://{}/api/health", addr);
    config.endpoint.interval_secs = 1;
    config.endpoint.timeout_secs = 1;
    config.collection.resource_interval_secs = 1;
    config.collection.network_interval_secs = 1;
    config.report.output_dir = temp_dir.path().to_path_buf();

    (config, temp_dir)
}

fn dump_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("metrics_"))
        .collect()
}

#[tokio::test]
async fn test_start_stop_writes_exactly_one_dump() {
    let (config, temp_dir) = create_test_config().await;
    let mut engine = MonitorEngine::new(config);

    engine.start().await.unwrap();
    assert_eq!(engine.status().await, EngineStatus::Running);

    // Let each collector take at least its immediate first sample.
    sleep(Duration::from_millis(500)).await;

    let dump_path = engine.stop().await.unwrap();
    assert_eq!(engine.status().await, EngineStatus::Stopped);

    let dumps = dump_files(&temp_dir);
    assert_eq!(dumps.len(), 1);
    assert_eq!(dump_path.file_name().unwrap().to_string_lossy(), dumps[0]);

    let content = std::fs::read_to_string(&dump_path).unwrap();
    let history: MetricHistory = serde_json::from_str(&content).unwrap();
    assert!(!history.samples(MetricKind::Cpu).is_empty());
    assert!(!history.samples(MetricKind::Memory).is_empty());
    // The endpoint is unreachable by construction, so its cycles show up as
    // probe failures rather than latency samples.
    assert!(history.samples(MetricKind::EndpointLatency).is_empty());
    assert!(!history.errors().is_empty());
}

#[tokio::test]
async fn test_stop_mid_sleep_completes_within_bound() {
    let (config, _temp_dir) = create_test_config().await;
    let mut engine = MonitorEngine::new(config);

    engine.start().await.unwrap();

    // All loops are mid-sleep; the bound is max(intervals) + endpoint timeout.
    let stopped = timeout(Duration::from_secs(10), engine.stop()).await;
    assert!(stopped.is_ok(), "stop did not complete within the shutdown bound");
    stopped.unwrap().unwrap();
}

#[tokio::test]
async fn test_double_start_is_a_usage_error() {
    let (config, _temp_dir) = create_test_config().await;
    let mut engine = MonitorEngine::new(config);

    engine.start().await.unwrap();
    let second = engine.start().await;
    assert!(second.is_err());
    assert_eq!(second.unwrap_err().category(), "usage");

    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_without_start_is_a_usage_error() {
    let (config, _temp_dir) = create_test_config().await;
    let mut engine = MonitorEngine::new(config);

    let result = engine.stop().await;
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().category(), "usage");
}

#[tokio::test]
async fn test_restart_begins_a_fresh_history() {
    let (config, _temp_dir) = create_test_config().await;
    let mut engine = MonitorEngine::new(config);

    engine.start().await.unwrap();
    sleep(Duration::from_millis(300)).await;
    engine.stop().await.unwrap();

    // The dumped history is discarded on stop.
    assert!(engine.store().snapshot().await.is_empty());

    engine.start().await.unwrap();
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_suggestions_over_empty_aggregates_are_empty() {
    let (config, _temp_dir) = create_test_config().await;
    let engine = MonitorEngine::new(config);

    let summary = report::summarize(&engine.store().snapshot().await);
    assert_eq!(summary.total_errors, 0);
    assert!(recommend::optimization_suggestions(&summary).is_empty());
    assert!(recommend::recommendations(&summary).is_empty());
}
