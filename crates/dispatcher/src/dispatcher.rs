//! MulticastDispatcher - primary-first notify with multicast fan-out

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use contracts::{
    ContractError, Context, Delivery, MulticastBlueprint, Notification, PrimaryNotifier, Priority,
    Receipt,
};

use crate::error::DispatchError;
use crate::handle::TargetHandle;
use crate::primary::TracingPrimary;
use crate::registry::TargetRegistry;

/// Dispatcher that replicates notifications to multicast targets.
///
/// Multicast is additive: every message goes through the primary path first
/// and that result is what the caller sees. Fan-out is fire-and-forget.
pub struct MulticastDispatcher<N> {
    primary: N,
    registry: Arc<TargetRegistry>,
    retry: Option<u32>,
}

impl<N: PrimaryNotifier> MulticastDispatcher<N> {
    /// Create a dispatcher over a built registry
    pub fn new(primary: N, registry: Arc<TargetRegistry>, retry: Option<u32>) -> Self {
        Self {
            primary,
            registry,
            retry,
        }
    }

    /// The routing table this dispatcher reads
    pub fn registry(&self) -> &Arc<TargetRegistry> {
        &self.registry
    }

    /// Deliver `msg` through the primary path, then replicate it to every
    /// matched multicast target.
    ///
    /// The primary result is returned unchanged; a primary failure aborts
    /// before any fan-out, and fan-out failures never affect the result.
    #[instrument(
        name = "multicast_notify",
        skip(self, ctxt, msg),
        fields(message_id = %msg.message_id, priority = %priority)
    )]
    pub async fn notify(
        &self,
        ctxt: &Context,
        msg: &Notification,
        priority: Priority,
    ) -> Result<Receipt, ContractError> {
        let receipt = self.primary.notify(ctxt, msg, priority, self.retry).await?;

        let filter = msg.filter_keys();
        for (event, targets) in self.registry.routes() {
            if !filter.iter().any(|key| key == event) {
                continue;
            }
            self.fan_out(ctxt, event, msg, priority, targets);
        }

        Ok(receipt)
    }

    /// Number of targets the message would fan out to at this priority
    pub fn matched_target_count(&self, msg: &Notification, priority: Priority) -> usize {
        let filter = msg.filter_keys();
        self.registry
            .routes()
            .filter(|(event, _)| filter.iter().any(|key| key == event))
            .map(|(_, targets)| {
                targets
                    .iter()
                    .filter(|t| t.supports(priority))
                    .count()
            })
            .sum()
    }

    /// Enqueue the message on every target of one matched event.
    ///
    /// Explicit per-target try/continue: an unsupported priority or a full
    /// queue on one target never stops the remaining targets.
    fn fan_out(
        &self,
        ctxt: &Context,
        event: &str,
        msg: &Notification,
        priority: Priority,
        targets: &[Arc<TargetHandle>],
    ) {
        for target in targets {
            debug!(
                event = %event,
                topic = %target.topic(),
                "Multicasting"
            );
            let delivery = Delivery {
                context: ctxt.clone(),
                event_type: event.to_string(),
                priority,
                publisher_id: self.registry.publisher_id().to_string(),
                message: msg.clone(),
            };
            if let Err(e) = target.try_publish(delivery) {
                warn!(topic = %target.topic(), error = %e, "Skipping target");
            }
        }
    }
}

/// Convenience function to create a dispatcher from a blueprint, using the
/// configured built-in transport and the tracing primary path
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub async fn create_dispatcher(
    blueprint: &MulticastBlueprint,
) -> Result<MulticastDispatcher<TracingPrimary>, DispatchError> {
    let registry = TargetRegistry::connect(blueprint).await?;
    Ok(MulticastDispatcher::new(
        TracingPrimary::new(),
        Arc::new(registry),
        blueprint.retry,
    ))
}
