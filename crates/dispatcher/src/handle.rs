//! TargetHandle - manages a publish target with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ContractError, Delivery, Priority, PrioritySet, Publisher};

use crate::metrics::TargetMetrics;

/// Handle to a running publish-target worker
pub struct TargetHandle {
    /// Fully-qualified topic name (target identity)
    topic: String,
    /// Priorities the underlying publisher supports
    capabilities: PrioritySet,
    /// Channel to send deliveries to worker
    tx: mpsc::Sender<Delivery>,
    /// Shared metrics
    metrics: Arc<TargetMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl TargetHandle {
    /// Create a new TargetHandle and spawn the worker task
    pub fn spawn<P: Publisher + Send + 'static>(publisher: P, queue_capacity: usize) -> Self {
        let topic = publisher.topic().to_string();
        let capabilities = publisher.capabilities();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(TargetMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_topic = topic.clone();

        let worker_handle = tokio::spawn(async move {
            target_worker(publisher, rx, worker_metrics, worker_topic).await;
        });

        Self {
            topic,
            capabilities,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Fully-qualified topic name (reverse lookup for diagnostics)
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Priorities this target exposes a delivery operation for
    pub fn capabilities(&self) -> PrioritySet {
        self.capabilities
    }

    /// Whether this target can deliver at the given priority
    pub fn supports(&self, priority: Priority) -> bool {
        self.capabilities.contains(priority)
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<TargetMetrics> {
        &self.metrics
    }

    /// Enqueue a delivery, gated on the target's capability set.
    ///
    /// An unsupported priority is a typed error, decided here without
    /// probing the publisher; the delivery is not enqueued.
    pub fn try_publish(&self, delivery: Delivery) -> Result<bool, ContractError> {
        if !self.capabilities.contains(delivery.priority) {
            self.metrics.inc_unsupported_count();
            return Err(ContractError::unsupported_priority(
                &self.topic,
                delivery.priority,
            ));
        }
        Ok(self.try_send(delivery))
    }

    /// Send a delivery to the target (non-blocking)
    ///
    /// Returns true if enqueued, false if queue full (delivery dropped)
    pub fn try_send(&self, delivery: Delivery) -> bool {
        match self.tx.try_send(delivery) {
            Ok(()) => {
                // Update queue length approximation
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(d)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    topic = %self.topic,
                    message_id = %d.message.message_id,
                    "Queue full, delivery dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(topic = %self.topic, "Target worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the target worker gracefully, draining queued deliveries
    #[instrument(name = "target_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(topic = %self.topic, error = ?e, "Worker task panicked");
        }
        debug!(topic = %self.topic, "TargetHandle shutdown complete");
    }
}

/// Worker task that consumes deliveries and invokes the publisher
#[instrument(
    name = "target_worker_loop",
    skip(publisher, rx, metrics),
    fields(topic = %topic)
)]
async fn target_worker<P: Publisher>(
    mut publisher: P,
    mut rx: mpsc::Receiver<Delivery>,
    metrics: Arc<TargetMetrics>,
    topic: String,
) {
    debug!(topic = %topic, "Target worker started");

    while let Some(delivery) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        match publisher.deliver(&delivery).await {
            Ok(()) => {
                metrics.inc_delivered_count();
            }
            Err(e) => {
                metrics.inc_failed_count();
                error!(
                    topic = %topic,
                    message_id = %delivery.message.message_id,
                    error = %e,
                    "Delivery failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = publisher.close().await {
        error!(topic = %topic, error = %e, "Close failed on shutdown");
    }

    debug!(topic = %topic, "Target worker stopped");
}
