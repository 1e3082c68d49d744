//! HTTP health endpoint probing
//!
//! Issues one GET per cycle against the configured health URL with a hard
//! client timeout. A reachable endpoint always yields a latency sample; a
//! non-2xx status additionally yields an error entry, and a transport or
//! timeout failure yields an error entry only.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::alert::AlertEvaluator;
use crate::config::EndpointConfig;
use crate::error::{CollectionError, Result};
use crate::store::{ErrorEntry, MetricKind, MetricStore, Sample};

/// Scheduled worker probing a remote health endpoint
pub struct EndpointHealthCollector {
    store: MetricStore,
    alerts: AlertEvaluator,
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
}

impl EndpointHealthCollector {
    pub fn new(
        store: MetricStore,
        alerts: AlertEvaluator,
        config: &EndpointConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            store,
            alerts,
            client,
            url: config.url.clone(),
            timeout,
            interval: Duration::from_secs(config.interval_secs),
            cancel,
        })
    }

    /// Probing loop; exits when the cancellation token fires
    ///
    /// The client-level timeout bounds any in-flight request, so shutdown
    /// latency is bounded by one interval plus that timeout.
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => self.probe_once().await,
            }
        }
        debug!("endpoint collector stopped");
    }

    /// Run one probe cycle
    pub async fn probe_once(&self) {
        let started = Instant::now();
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;
                let status = response.status();

                let sample = Sample::new(
                    MetricKind::EndpointLatency,
                    HashMap::from([
                        ("response_time_ms".to_string(), response_time_ms),
                        ("status_code".to_string(), status.as_u16() as f64),
                    ]),
                );
                self.store.record_sample(sample.clone()).await;

                if let Some(alert) = self.alerts.evaluate(&sample) {
                    warn!("{}", alert);
                }

                // A non-2xx response is both a latency sample and an error.
                if !status.is_success() {
                    let entry = ErrorEntry::new(
                        MetricKind::EndpointLatency,
                        format!("{} returned HTTP {}", self.url, status.as_u16()),
                    );
                    warn!("{}", entry.message);
                    self.store.record_error(entry).await;
                }
            }
            Err(e) => {
                let failure = if e.is_timeout() {
                    CollectionError::Timeout {
                        url: self.url.clone(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    CollectionError::Unreachable {
                        url: self.url.clone(),
                        reason: e.to_string(),
                    }
                };
                error!("health probe failed: {}", failure);
                self.store
                    .record_error(ErrorEntry::new(MetricKind::EndpointLatency, failure.to_string()))
                    .await;
            }
        }
    }
}
