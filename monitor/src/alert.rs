//! Per-sample alert policy
//!
//! A stateless threshold table evaluated synchronously by each collector
//! right after it records a sample. Alerts are log lines, not stored
//! entities; there is no deduplication or rate limiting.

use std::fmt;

use crate::config::AlertThresholds;
use crate::store::{MetricKind, Sample};

/// A threshold breach produced by [`AlertEvaluator::evaluate`]
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Metric kind that breached
    pub kind: MetricKind,

    /// Field that was compared
    pub field: &'static str,

    /// Observed value
    pub value: f64,

    /// Configured threshold
    pub threshold: f64,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MetricKind::Cpu => write!(f, "CPU usage high: {:.1}% (threshold {:.0}%)", self.value, self.threshold),
            MetricKind::Memory => write!(f, "memory usage high: {:.1}% (threshold {:.0}%)", self.value, self.threshold),
            MetricKind::EndpointLatency => write!(
                f,
                "response time high: {:.2}ms (threshold {:.0}ms)",
                self.value, self.threshold
            ),
            MetricKind::Network => write!(f, "{} {} above {}: {}", self.kind, self.field, self.threshold, self.value),
        }
    }
}

/// Stateless threshold policy shared by all collectors
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate one sample against the policy table
    ///
    /// Returns the breach for the caller to log. Network samples carry
    /// cumulative counters and never alert.
    pub fn evaluate(&self, sample: &Sample) -> Option<Alert> {
        let (field, threshold) = match sample.kind {
            MetricKind::Cpu => ("percent", self.thresholds.cpu_percent),
            MetricKind::Memory => ("percent", self.thresholds.memory_percent),
            MetricKind::EndpointLatency => ("response_time_ms", self.thresholds.response_time_ms),
            MetricKind::Network => return None,
        };

        let value = sample.field(field)?;
        if value > threshold {
            Some(Alert {
                kind: sample.kind,
                field,
                value,
                threshold,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn evaluator() -> AlertEvaluator {
        AlertEvaluator::new(AlertThresholds::default())
    }

    fn sample(kind: MetricKind, field: &str, value: f64) -> Sample {
        Sample::new(kind, HashMap::from([(field.to_string(), value)]))
    }

    #[test]
    fn test_cpu_sequence_fires_two_alerts() {
        let evaluator = evaluator();
        let fired: Vec<Alert> = [50.0, 90.0, 95.0]
            .into_iter()
            .filter_map(|percent| evaluator.evaluate(&sample(MetricKind::Cpu, "percent", percent)))
            .collect();

        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].value, 90.0);
        assert_eq!(fired[1].value, 95.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let evaluator = evaluator();
        assert!(evaluator
            .evaluate(&sample(MetricKind::Memory, "percent", 80.0))
            .is_none());
        assert!(evaluator
            .evaluate(&sample(MetricKind::Memory, "percent", 80.1))
            .is_some());
    }

    #[test]
    fn test_slow_response_alerts_regardless_of_status() {
        let evaluator = evaluator();
        let mut fields = HashMap::from([("response_time_ms".to_string(), 1500.0)]);
        fields.insert("status_code".to_string(), 200.0);
        let alert = evaluator
            .evaluate(&Sample::new(MetricKind::EndpointLatency, fields))
            .expect("1500ms should breach the 1000ms threshold");
        assert_eq!(alert.field, "response_time_ms");
    }

    #[test]
    fn test_network_samples_never_alert() {
        let evaluator = evaluator();
        let sample = sample(MetricKind::Network, "bytes_sent", f64::MAX);
        assert!(evaluator.evaluate(&sample).is_none());
    }
}
