//! Configuration management for the Vigil monitoring engine
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files, with defaults matching the monitored deployment's
//! conventions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Main configuration structure for the monitoring engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Health endpoint probing configuration
    pub endpoint: EndpointConfig,

    /// Host resource and network sampling configuration
    pub collection: CollectionConfig,

    /// Periodic report configuration
    pub report: ReportConfig,

    /// Alert thresholds evaluated per sample
    pub alerts: AlertThresholds,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Lighthouse page-audit configuration
    pub audit: AuditConfig,
}

/// Health endpoint probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Health-check URL probed once per cycle
    pub url: String,

    /// Seconds between probes
    pub interval_secs: u64,

    /// Hard timeout for one probe in seconds
    pub timeout_secs: u64,
}

/// Host sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Seconds between CPU/memory samples
    pub resource_interval_secs: u64,

    /// Seconds between network counter samples
    pub network_interval_secs: u64,
}

/// Periodic report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Seconds between report cycles
    pub interval_secs: u64,

    /// Directory receiving report and metrics-dump artifacts
    pub output_dir: PathBuf,
}

/// Alert thresholds evaluated per sample
///
/// An alert is a log line, not a stored entity; a sustained breach produces
/// one alert per sampling cycle for as long as the condition holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// CPU utilization percentage above which a WARN alert fires
    pub cpu_percent: f64,

    /// Memory utilization percentage above which a WARN alert fires
    pub memory_percent: f64,

    /// Endpoint response time in milliseconds above which a WARN alert fires
    pub response_time_ms: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Append-only log file, in addition to console output
    pub file_path: Option<PathBuf>,

    /// Enable console logging
    pub console: bool,
}

/// Lighthouse page-audit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Page URL handed to the lighthouse binary
    pub page_url: String,

    /// Destination for the JSON audit output
    pub output_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            collection: CollectionConfig::default(),
            report: ReportConfig::default(),
            alerts: AlertThresholds::default(),
            logging: LoggingConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000/api/health".to_string(),
            interval_secs: 10,
            timeout_secs: 5,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            resource_interval_secs: 5,
            network_interval_secs: 15,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 80.0,
            response_time_ms: 1000.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: Some(PathBuf::from("performance.log")),
            console: true,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            page_url: "http://localhost:3000".to_string(),
            output_path: PathBuf::from("lighthouse-audit.json"),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        })?;

        let config: MonitorConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError { reason: e.to_string() })?;

        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| ConfigError::ValidationFailed {
            reason: "could not determine user configuration directory".to_string(),
        })?;
        Ok(base.join("vigil").join("monitor.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint.url.is_empty()
            || !(self.endpoint.url.starts_with("http://") || self.endpoint.url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "endpoint.url".to_string(),
                value: self.endpoint.url.clone(),
            });
        }

        for (field, value) in [
            ("endpoint.interval_secs", self.endpoint.interval_secs),
            ("endpoint.timeout_secs", self.endpoint.timeout_secs),
            ("collection.resource_interval_secs", self.collection.resource_interval_secs),
            ("collection.network_interval_secs", self.collection.network_interval_secs),
            ("report.interval_secs", self.report.interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for (field, value) in [
            ("alerts.cpu_percent", self.alerts.cpu_percent),
            ("alerts.memory_percent", self.alerts.memory_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.alerts.response_time_ms <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.response_time_ms".to_string(),
                value: self.alerts.response_time_ms.to_string(),
            });
        }

        Ok(())
    }
}
