//! Network counter sampling
//!
//! Records the host's cumulative I/O totals summed across interfaces. The
//! sample intentionally carries raw cumulative counters, not deltas; rate
//! derivation is a read-time concern for report consumers.

use std::collections::HashMap;
use std::time::Duration;

use sysinfo::{NetworkExt, NetworksExt, System, SystemExt};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::{CollectionError, CollectionResult};
use crate::store::{ErrorEntry, MetricKind, MetricStore, Sample};

/// Scheduled worker sampling cumulative network counters
pub struct NetworkCollector {
    store: MetricStore,
    interval: Duration,
    cancel: CancellationToken,
    system: System,
}

impl NetworkCollector {
    pub fn new(store: MetricStore, interval: Duration, cancel: CancellationToken) -> Self {
        let mut system = System::new();
        system.refresh_networks_list();

        Self {
            store,
            interval,
            cancel,
            system,
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
        debug!("network collector stopped");
    }

    /// Run one sampling cycle
    pub async fn collect_once(&mut self) {
        match self.read_sample() {
            Ok(sample) => self.store.record_sample(sample).await,
            Err(e) => {
                error!("network sampling failed: {}", e);
                self.store
                    .record_error(ErrorEntry::new(MetricKind::Network, e.to_string()))
                    .await;
            }
        }
    }

    fn read_sample(&mut self) -> CollectionResult<Sample> {
        self.system.refresh_networks();
        let networks = self.system.networks();

        if networks.iter().next().is_none() {
            return Err(CollectionError::HostProbe {
                kind: MetricKind::Network,
                reason: "no network interfaces visible".to_string(),
            });
        }

        let mut bytes_sent = 0u64;
        let mut bytes_recv = 0u64;
        let mut packets_sent = 0u64;
        let mut packets_recv = 0u64;
        for (_, data) in networks.iter() {
            bytes_sent += data.total_transmitted();
            bytes_recv += data.total_received();
            packets_sent += data.total_packets_transmitted();
            packets_recv += data.total_packets_received();
        }

        Ok(Sample::new(
            MetricKind::Network,
            HashMap::from([
                ("bytes_sent".to_string(), bytes_sent as f64),
                ("bytes_recv".to_string(), bytes_recv as f64),
                ("packets_sent".to_string(), packets_sent as f64),
                ("packets_recv".to_string(), packets_recv as f64),
            ]),
        ))
    }
}
