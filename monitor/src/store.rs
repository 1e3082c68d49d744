//! Shared metric history for the Vigil monitoring engine
//!
//! All collectors append into one [`MetricStore`]; the report generator and
//! the engine shutdown path read point-in-time snapshots. The store is an
//! append-only, per-kind ordered history and is never truncated while the
//! engine is running.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The kinds of metrics tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    Network,
    EndpointLatency,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Network => "network",
            MetricKind::EndpointLatency => "endpoint_latency",
        };
        f.write_str(name)
    }
}

/// One timestamped observation of a metric kind
///
/// Fields are kind-specific: cpu carries `percent`; memory carries `used`,
/// `available` and `percent`; network carries the raw cumulative counters;
/// endpoint_latency carries `response_time_ms` and `status_code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Observation timestamp
    pub timestamp: DateTime<Utc>,

    /// Metric kind this sample belongs to
    pub kind: MetricKind,

    /// Kind-specific numeric fields
    pub fields: HashMap<String, f64>,
}

impl Sample {
    /// Create a sample stamped with the current time
    pub fn new(kind: MetricKind, fields: HashMap<String, f64>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            fields,
        }
    }

    /// Look up a single field value
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// A timestamped record of a failed observation attempt
///
/// Distinct from a [`Sample`]: error entries are counted, never averaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Failure timestamp
    pub timestamp: DateTime<Utc>,

    /// Metric kind whose probe failed
    pub kind: MetricKind,

    /// Human-readable failure description
    pub message: String,
}

impl ErrorEntry {
    /// Create an error entry stamped with the current time
    pub fn new(kind: MetricKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            message: message.into(),
        }
    }
}

/// Owned, point-in-time copy of the recorded history
///
/// This is both the snapshot type handed to readers and the serialized shape
/// of the `metrics_<epoch>.json` shutdown dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricHistory {
    /// Per-kind ordered samples
    samples: HashMap<MetricKind, Vec<Sample>>,

    /// Ordered record of failed probes across all kinds
    errors: Vec<ErrorEntry>,
}

impl MetricHistory {
    /// All samples recorded for one kind, oldest first
    pub fn samples(&self, kind: MetricKind) -> &[Sample] {
        self.samples.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All recorded probe failures, oldest first
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Total number of samples across all kinds
    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    /// True when nothing has been recorded yet (no samples and no errors)
    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0 && self.errors.is_empty()
    }

    /// Arithmetic mean of one field over all samples of a kind
    ///
    /// Returns 0 when no sample carries the field, so aggregates over an
    /// empty history are well-defined.
    pub fn field_mean(&self, kind: MetricKind, field: &str) -> f64 {
        let values: Vec<f64> = self
            .samples(kind)
            .iter()
            .filter_map(|sample| sample.field(field))
            .collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn push_sample(&mut self, sample: Sample) {
        self.samples.entry(sample.kind).or_default().push(sample);
    }

    fn push_error(&mut self, entry: ErrorEntry) {
        self.errors.push(entry);
    }
}

/// Cloneable handle to the shared metric history
///
/// Appends and snapshot reads are synchronized with a single RwLock; each
/// kind has exactly one writer (its collector), so per-kind timestamps are
/// non-decreasing.
#[derive(Clone)]
pub struct MetricStore {
    inner: Arc<RwLock<MetricHistory>>,
}

impl MetricStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricHistory::default())),
        }
    }

    /// Append one sample
    pub async fn record_sample(&self, sample: Sample) {
        self.inner.write().await.push_sample(sample);
    }

    /// Append one probe-failure entry
    pub async fn record_error(&self, entry: ErrorEntry) {
        self.inner.write().await.push_error(entry);
    }

    /// Take a consistent point-in-time copy of the full history
    pub async fn snapshot(&self) -> MetricHistory {
        self.inner.read().await.clone()
    }

    /// Number of samples recorded for one kind
    pub async fn sample_count(&self, kind: MetricKind) -> usize {
        self.inner.read().await.samples(kind).len()
    }

    /// Number of probe failures recorded so far
    pub async fn error_count(&self) -> usize {
        self.inner.read().await.errors().len()
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}
