//! Periodic report generation
//!
//! The report generator runs on its own cadence, takes a snapshot of the
//! shared history, aggregates it into a summary, attaches recommendations
//! and persists one uniquely named JSON artifact per cycle. Averages are
//! cumulative over the entire history since engine start.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::recommend;
use crate::store::{MetricHistory, MetricKind, MetricStore};

/// Aggregate view of the recorded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Mean of all recorded CPU utilization percentages
    pub avg_cpu: f64,

    /// Mean of all recorded memory utilization percentages
    pub avg_memory: f64,

    /// Mean endpoint response time; error-only cycles are excluded
    pub avg_response_time_ms: f64,

    /// Count of all probe failures ever recorded
    pub total_errors: u64,
}

/// One immutable report artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report generation time
    pub timestamp: DateTime<Utc>,

    /// Aggregated metrics
    pub summary: ReportSummary,

    /// Advisory strings derived from the summary
    pub recommendations: Vec<String>,
}

/// Aggregate a history snapshot into a summary
///
/// Metrics with no samples yet report an average of 0, not NaN.
pub fn summarize(history: &MetricHistory) -> ReportSummary {
    ReportSummary {
        avg_cpu: history.field_mean(MetricKind::Cpu, "percent"),
        avg_memory: history.field_mean(MetricKind::Memory, "percent"),
        avg_response_time_ms: history.field_mean(MetricKind::EndpointLatency, "response_time_ms"),
        total_errors: history.errors().len() as u64,
    }
}

/// Scheduled worker that aggregates the shared history into report artifacts
pub struct ReportGenerator {
    store: MetricStore,
    output_dir: PathBuf,
    interval: Duration,
    cancel: CancellationToken,
}

impl ReportGenerator {
    pub fn new(store: MetricStore, config: &ReportConfig, cancel: CancellationToken) -> Self {
        Self {
            store,
            output_dir: config.output_dir.clone(),
            interval: Duration::from_secs(config.interval_secs),
            cancel,
        }
    }

    /// Reporting loop; exits when the cancellation token fires
    ///
    /// The first cycle runs one full interval after start, so early cycles
    /// are not dominated by an empty history.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => self.generate_once().await,
            }
        }
        debug!("report generator stopped");
    }

    /// Run one reporting cycle
    ///
    /// A persistence failure drops this cycle's report and is never fatal
    /// to the engine or the collectors.
    pub async fn generate_once(&self) {
        let history = self.store.snapshot().await;
        if history.is_empty() {
            debug!("no metrics recorded yet; skipping report cycle");
            return;
        }

        let summary = summarize(&history);
        let report = Report {
            timestamp: Utc::now(),
            recommendations: recommend::recommendations(&summary),
            summary,
        };

        match self.write_report(&report) {
            Ok(path) => {
                info!(
                    "report written to {}: CPU {:.1}%, memory {:.1}%, response {:.1}ms, {} errors",
                    path.display(),
                    report.summary.avg_cpu,
                    report.summary.avg_memory,
                    report.summary.avg_response_time_ms,
                    report.summary.total_errors,
                );
            }
            Err(e) => error!("report cycle dropped: {}", e),
        }
    }

    /// Persist one report as `performance_report_<epoch>.json`
    fn write_report(&self, report: &Report) -> ReportResult<PathBuf> {
        let path = self
            .output_dir
            .join(format!("performance_report_{}.json", report.timestamp.timestamp()));

        let rendered = serde_json::to_string_pretty(report)
            .map_err(|e| ReportError::Serialization { reason: e.to_string() })?;

        fs::write(&path, rendered).map_err(|e| ReportError::WriteFailed {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    use crate::store::{ErrorEntry, Sample};

    async fn store_with_cpu_samples(values: &[f64]) -> MetricStore {
        let store = MetricStore::new();
        for value in values {
            let fields = HashMap::from([("percent".to_string(), *value)]);
            store.record_sample(Sample::new(MetricKind::Cpu, fields)).await;
        }
        store
    }

    fn generator(store: MetricStore, dir: &TempDir) -> ReportGenerator {
        let config = ReportConfig {
            interval_secs: 300,
            output_dir: dir.path().to_path_buf(),
        };
        ReportGenerator::new(store, &config, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_cumulative_average_over_cpu_samples() {
        let store = store_with_cpu_samples(&[50.0, 90.0, 95.0]).await;
        let summary = summarize(&store.snapshot().await);

        assert!((summary.avg_cpu - 78.33).abs() < 0.01);
        assert_eq!(summary.avg_memory, 0.0);
        assert_eq!(summary.avg_response_time_ms, 0.0);
        assert_eq!(summary.total_errors, 0);
    }

    #[tokio::test]
    async fn test_error_only_cycles_are_excluded_from_latency_mean() {
        let store = MetricStore::new();
        store
            .record_error(ErrorEntry::new(MetricKind::EndpointLatency, "connection refused"))
            .await;
        store
            .record_error(ErrorEntry::new(MetricKind::EndpointLatency, "timed out"))
            .await;

        let summary = summarize(&store.snapshot().await);
        assert_eq!(summary.avg_response_time_ms, 0.0);
        assert_eq!(summary.total_errors, 2);
    }

    #[tokio::test]
    async fn test_report_artifact_is_written_per_cycle() {
        let dir = TempDir::new().unwrap();
        let store = store_with_cpu_samples(&[75.0, 85.0]).await;
        let generator = generator(store, &dir);

        generator.generate_once().await;

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("performance_report_"));
        assert!(entries[0].ends_with(".json"));

        let content = std::fs::read_to_string(dir.path().join(&entries[0])).unwrap();
        let report: Report = serde_json::from_str(&content).unwrap();
        assert!((report.summary.avg_cpu - 80.0).abs() < f64::EPSILON);
        assert!(report.recommendations.iter().any(|r| r.starts_with("CPU high")));
    }

    #[tokio::test]
    async fn test_empty_history_skips_the_cycle() {
        let dir = TempDir::new().unwrap();
        let generator = generator(MetricStore::new(), &dir);

        generator.generate_once().await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let store = store_with_cpu_samples(&[50.0]).await;
        let config = ReportConfig {
            interval_secs: 300,
            output_dir: dir.path().join("missing").join("nested"),
        };
        let generator = ReportGenerator::new(store, &config, CancellationToken::new());

        // The cycle is logged and dropped; no artifact, no panic.
        generator.generate_once().await;
    }
}
