//! Engine lifecycle
//!
//! The engine owns the shared store and the worker loops: three collectors
//! plus the report generator, all sharing one cancellation token. Shutdown
//! is cooperative; once every loop has drained, the full history is flushed
//! to a timestamped artifact.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::signal;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::alert::AlertEvaluator;
use crate::collectors::{EndpointHealthCollector, NetworkCollector, ResourceCollector};
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::report::ReportGenerator;
use crate::store::{MetricHistory, MetricStore};

/// Engine lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Stopped,
    Running,
    Stopping,
}

/// Monitoring engine owning the shared store and all worker loops
pub struct MonitorEngine {
    /// Configuration
    config: MonitorConfig,

    /// Shared metric history
    store: MetricStore,

    /// Lifecycle state
    status: Arc<RwLock<EngineStatus>>,

    /// Cooperative stop flag observed by every loop
    cancel: CancellationToken,

    /// Spawned worker loops
    workers: Vec<JoinHandle<()>>,
}

impl MonitorEngine {
    /// Create a stopped engine
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            store: MetricStore::new(),
            status: Arc::new(RwLock::new(EngineStatus::Stopped)),
            cancel: CancellationToken::new(),
            workers: Vec::new(),
        }
    }

    /// Handle to the shared store (used by the `suggestions` command)
    pub fn store(&self) -> MetricStore {
        self.store.clone()
    }

    /// Current lifecycle state
    pub async fn status(&self) -> EngineStatus {
        *self.status.read().await
    }

    /// Launch all worker loops
    ///
    /// Starting an engine that is not stopped is a usage error.
    pub async fn start(&mut self) -> Result<()> {
        {
            let mut status = self.status.write().await;
            if *status != EngineStatus::Stopped {
                return Err(MonitorError::Usage("engine is already running".to_string()));
            }
            *status = EngineStatus::Running;
        }

        self.cancel = CancellationToken::new();
        let alerts = AlertEvaluator::new(self.config.alerts.clone());

        let endpoint = match EndpointHealthCollector::new(
            self.store.clone(),
            alerts.clone(),
            &self.config.endpoint,
            self.cancel.child_token(),
        ) {
            Ok(collector) => collector,
            Err(e) => {
                *self.status.write().await = EngineStatus::Stopped;
                return Err(e);
            }
        };

        let resources = ResourceCollector::new(
            self.store.clone(),
            alerts.clone(),
            Duration::from_secs(self.config.collection.resource_interval_secs),
            self.cancel.child_token(),
        );

        let network = NetworkCollector::new(
            self.store.clone(),
            Duration::from_secs(self.config.collection.network_interval_secs),
            self.cancel.child_token(),
        );

        let reporter = ReportGenerator::new(
            self.store.clone(),
            &self.config.report,
            self.cancel.child_token(),
        );

        self.workers = vec![
            tokio::spawn(resources.run()),
            tokio::spawn(endpoint.run()),
            tokio::spawn(network.run()),
            tokio::spawn(reporter.run()),
        ];

        info!(
            "monitoring started: resources every {}s, endpoint {} every {}s, network every {}s, reports every {}s",
            self.config.collection.resource_interval_secs,
            self.config.endpoint.url,
            self.config.endpoint.interval_secs,
            self.config.collection.network_interval_secs,
            self.config.report.interval_secs,
        );
        Ok(())
    }

    /// Drain all loops and flush the history to `metrics_<epoch>.json`
    ///
    /// Returns the dump path. The dumped history is discarded afterwards; a
    /// later `start` begins a fresh monitoring lifetime.
    pub async fn stop(&mut self) -> Result<PathBuf> {
        {
            let mut status = self.status.write().await;
            if *status != EngineStatus::Running {
                return Err(MonitorError::Usage("engine is not running".to_string()));
            }
            *status = EngineStatus::Stopping;
        }
        info!("stopping monitoring engine");

        self.cancel.cancel();
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                error!("worker task failed during shutdown: {}", e);
            }
        }

        let history = self.store.snapshot().await;
        let path = self.dump_history(&history)?;
        info!(
            "metrics saved to {} ({} samples, {} errors)",
            path.display(),
            history.sample_count(),
            history.errors().len(),
        );

        self.store = MetricStore::new();
        *self.status.write().await = EngineStatus::Stopped;
        Ok(path)
    }

    /// Serialize the full history, exactly once per stop
    fn dump_history(&self, history: &MetricHistory) -> Result<PathBuf> {
        let path = self
            .config
            .report
            .output_dir
            .join(format!("metrics_{}.json", Utc::now().timestamp()));
        let rendered = serde_json::to_string_pretty(history)?;
        fs::write(&path, rendered)?;
        Ok(path)
    }

    /// Block until the operator interrupts the process
    pub async fn wait_for_shutdown(&self) -> Result<()> {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                info!("received SIGINT, initiating graceful shutdown");
            }
        }

        Ok(())
    }
}
