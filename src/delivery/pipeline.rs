//! Asynchronous record delivery with retry and health probing

use super::events::EventBuilder;
use super::health::{HealthMonitor, HealthState};
use super::queue::DeliveryQueue;
use crate::config::DeliveryConfig;
use crate::core::record::CaptureRecord;
use crate::logger::HttpLogger;
use crate::sink::SinkClient;
use crate::sink::types::HealthResponse;
use crate::utils::error::{ObserverError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runtime knobs of the delivery pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub health_cooldown: Duration,
    pub probe_interval: Duration,
    pub health_check_timeout: Duration,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self::from(&DeliveryConfig::default())
    }
}

impl From<&DeliveryConfig> for DeliverySettings {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity,
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            health_cooldown: Duration::from_millis(config.health_cooldown_ms),
            probe_interval: Duration::from_millis(config.probe_interval_ms),
            health_check_timeout: Duration::from_millis(config.health_check_timeout_ms),
        }
    }
}

/// Ships capture records to an ingestion sink off the request path.
///
/// One consumer task drains the queue in FIFO order and one prober task
/// re-checks sink health while it is degraded. Both stop on [`stop`].
///
/// [`stop`]: DeliveryPipeline::stop
pub struct DeliveryPipeline {
    queue: DeliveryQueue<CaptureRecord>,
    health: HealthMonitor,
    sink: Arc<dyn SinkClient>,
    events: EventBuilder,
    settings: DeliverySettings,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DeliveryPipeline {
    /// Create an idle pipeline; call [`start`](Self::start) to spawn workers
    pub fn new(
        sink: Arc<dyn SinkClient>,
        events: EventBuilder,
        settings: DeliverySettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: DeliveryQueue::new(settings.queue_capacity),
            health: HealthMonitor::new(),
            sink,
            events,
            settings,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the consumer and prober on the current tokio runtime
    pub fn start(self: &Arc<Self>) {
        let consumer = tokio::spawn(Arc::clone(self).run_consumer());
        let prober = tokio::spawn(Arc::clone(self).run_prober());
        self.tasks.lock().extend([consumer, prober]);
        debug!(
            capacity = self.queue.capacity(),
            max_attempts = self.settings.max_attempts,
            "Delivery pipeline started"
        );
    }

    /// Queue a record. Never blocks and never fails the caller.
    pub fn submit(&self, record: CaptureRecord) {
        self.queue.push(record);
    }

    pub fn health(&self) -> HealthState {
        self.health.snapshot()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Signal every wait (queue, backoff, probe tick, in-flight call) to abort
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop and release the queue; records still queued are discarded
    pub fn close(&self) {
        self.stop();
        let discarded = self.queue.close();
        if discarded > 0 {
            warn!(discarded, "Delivery pipeline closed with undelivered records");
        }
    }

    /// Wait for the background tasks to finish after [`stop`](Self::stop)
    pub async fn join(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Delivery task failed: {}", e);
            }
        }
    }

    async fn run_consumer(self: Arc<Self>) {
        loop {
            let record = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                record = self.queue.pop() => record,
            };

            match record {
                Some(record) => {
                    self.deliver(&record).await;
                }
                None => break,
            }
        }
        debug!("Delivery consumer stopped");
    }

    async fn run_prober(self: Arc<Self>) {
        let period = self.settings.probe_interval;
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if self.health.is_probing() && self.check_health().await {
                        info!("Health probe detected sink recovery");
                    }
                }
            }
        }
        debug!("Health prober stopped");
    }

    /// Deliver one record with bounded retries.
    ///
    /// Returns whether the sink accepted it. Shutdown abandons the record.
    pub async fn deliver(&self, record: &CaptureRecord) -> bool {
        let request = self.events.build(record);
        let max_attempts = self.settings.max_attempts;
        let mut backoff = self.settings.initial_backoff;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        debug!(attempt, "Shutdown during backoff, abandoning record");
                        return false;
                    }
                    _ = sleep(backoff) => {}
                }
                backoff = backoff.saturating_mul(2);
            }

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(attempt, "Shutdown during send, abandoning record");
                    return false;
                }
                result = self.sink.ingest(&request) => result,
            };

            match result {
                Ok(response) => {
                    self.health.mark_healthy();
                    if !response.successes.is_empty() {
                        debug!(events = response.successes.len(), "Sent events to sink");
                    }
                    if !response.errors.is_empty() {
                        warn!(
                            failed = response.errors.len(),
                            "Sink rejected events: {:?}", response.errors
                        );
                    }
                    return true;
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "Failed to send record");
                    self.health.mark_unhealthy();
                }
            }
        }

        error!(max_attempts, url = %record.url, "Dropping record after exhausting retries");
        false
    }

    /// Explicit health check.
    ///
    /// Healthy state answers immediately. While probing, checks within the
    /// cooldown after the last failure report unhealthy without contacting
    /// the sink.
    pub async fn check_health(&self) -> bool {
        let state = self.health.snapshot();
        if !state.probing {
            return state.healthy;
        }
        if state.in_cooldown(self.settings.health_cooldown) {
            return false;
        }

        match self.probe_sink().await {
            Ok(health) if health.is_ok() => {
                self.health.mark_healthy();
                true
            }
            Ok(health) => {
                debug!(status = %health.status, "Sink reported not OK");
                false
            }
            Err(ObserverError::Cancelled(_)) => false,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// One bounded health call against the sink
    async fn probe_sink(&self) -> Result<HealthResponse> {
        let limit = self.settings.health_check_timeout;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(ObserverError::Cancelled("health check".to_string()))
            }
            outcome = timeout(limit, self.sink.health()) => outcome.map_err(|_| {
                ObserverError::Timeout(format!("health check after {} ms", limit.as_millis()))
            })?,
        }
    }
}

impl HttpLogger for DeliveryPipeline {
    fn print(&self, record: CaptureRecord) {
        self.submit(record);
    }

    fn close(&self) {
        DeliveryPipeline::close(self);
    }
}
