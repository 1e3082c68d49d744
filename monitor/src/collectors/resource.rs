//! CPU and memory sampling
//!
//! Reads host utilization through `sysinfo` every cycle and appends one
//! `cpu` and one `memory` sample per tick.

use std::collections::HashMap;
use std::time::Duration;

use sysinfo::{CpuExt, System, SystemExt};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::alert::AlertEvaluator;
use crate::error::{CollectionError, CollectionResult};
use crate::store::{ErrorEntry, MetricKind, MetricStore, Sample};

/// Scheduled worker sampling CPU and memory utilization
pub struct ResourceCollector {
    store: MetricStore,
    alerts: AlertEvaluator,
    interval: Duration,
    cancel: CancellationToken,
    system: System,
}

impl ResourceCollector {
    pub fn new(
        store: MetricStore,
        alerts: AlertEvaluator,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            alerts,
            interval,
            cancel,
            system: System::new(),
        }
    }

    /// Sampling loop; exits when the cancellation token fires
    pub async fn run(mut self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => self.collect_once().await,
            }
        }
        debug!("resource collector stopped");
    }

    /// Run one sampling cycle
    ///
    /// An introspection failure is recorded against the history and never
    /// terminates the loop.
    pub async fn collect_once(&mut self) {
        match self.read_samples() {
            Ok(samples) => {
                for sample in samples {
                    self.store.record_sample(sample.clone()).await;
                    if let Some(alert) = self.alerts.evaluate(&sample) {
                        warn!("{}", alert);
                    }
                }
            }
            Err(e) => {
                error!("resource sampling failed: {}", e);
                let kind = match &e {
                    CollectionError::HostProbe { kind, .. } => *kind,
                    _ => MetricKind::Cpu,
                };
                self.store.record_error(ErrorEntry::new(kind, e.to_string())).await;
            }
        }
    }

    fn read_samples(&mut self) -> CollectionResult<[Sample; 2]> {
        self.system.refresh_cpu();
        self.system.refresh_memory();

        let cpu_percent = self.system.global_cpu_info().cpu_usage() as f64;
        let cpu = Sample::new(
            MetricKind::Cpu,
            HashMap::from([("percent".to_string(), cpu_percent)]),
        );

        let total = self.system.total_memory();
        if total == 0 {
            return Err(CollectionError::HostProbe {
                kind: MetricKind::Memory,
                reason: "host reports zero total memory".to_string(),
            });
        }
        let used = self.system.used_memory();
        let available = self.system.available_memory();
        let memory = Sample::new(
            MetricKind::Memory,
            HashMap::from([
                ("used".to_string(), used as f64),
                ("available".to_string(), available as f64),
                ("percent".to_string(), used as f64 / total as f64 * 100.0),
            ]),
        );

        Ok([cpu, memory])
    }
}
