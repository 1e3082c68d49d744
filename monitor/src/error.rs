//! Error handling for the Vigil monitoring engine
//!
//! Per-cycle collection failures are recoverable by design: they are recorded
//! against the metric history and the owning loop continues on its next tick.
//! Only configuration and usage errors surface to the caller.

use std::io;

use thiserror::Error;

use crate::store::MetricKind;

/// The main error type for the monitoring engine
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Collection related errors
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// Report generation and persistence errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lifecycle misuse (e.g. starting an engine that is already running)
    #[error("Usage error: {0}")]
    Usage(String),
}

/// A single collector probe failure
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("host probe failed for {kind}: {reason}")]
    HostProbe { kind: MetricKind, reason: String },

    #[error("endpoint {url} unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("endpoint {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

/// Report persistence errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report write failed for {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("report serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("configuration parsing error: {reason}")]
    ParseError { reason: String },

    #[error("invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MonitorError>;

/// A specialized result type for collection operations
pub type CollectionResult<T> = std::result::Result<T, CollectionError>;

/// A specialized result type for report operations
pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// A specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl MonitorError {
    /// Check if this error is contained within a single loop iteration
    pub fn is_recoverable(&self) -> bool {
        match self {
            MonitorError::Collection(_) => true,
            MonitorError::Report(_) => true,
            MonitorError::Http(_) => true,
            MonitorError::Config(_) => false,
            MonitorError::Usage(_) => false,
            MonitorError::Io(io_error) => {
                matches!(io_error.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock)
            }
            MonitorError::Serialization(_) => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MonitorError::Collection(_) => "collection",
            MonitorError::Report(_) => "report",
            MonitorError::Config(_) => "config",
            MonitorError::Http(_) => "http",
            MonitorError::Io(_) => "io",
            MonitorError::Serialization(_) => "serialization",
            MonitorError::Usage(_) => "usage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let collection = MonitorError::Collection(CollectionError::HostProbe {
            kind: MetricKind::Cpu,
            reason: "cpu counters unavailable".to_string(),
        });
        assert_eq!(collection.category(), "collection");
        assert!(collection.is_recoverable());

        let usage = MonitorError::Usage("engine is already running".to_string());
        assert_eq!(usage.category(), "usage");
        assert!(!usage.is_recoverable());

        let report = MonitorError::Report(ReportError::WriteFailed {
            path: "/reports/performance_report_0.json".to_string(),
            reason: "disk full".to_string(),
        });
        assert_eq!(report.category(), "report");
        assert!(report.is_recoverable());
    }

    #[test]
    fn test_collection_error_display() {
        let err = CollectionError::Timeout {
            url: "http://localhost:5000/api/health".to_string(),
            timeout_ms: 5000,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("timed out"));
        assert!(rendered.contains("5000ms"));
    }
}
