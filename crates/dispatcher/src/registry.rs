//! TargetRegistry - event to publish-target routing table
//!
//! Built once, single-threaded, before any traffic; read-only afterwards,
//! which is what makes concurrent dispatch safe without locks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use contracts::{qualified_topic, ContractError, MulticastBlueprint, Transport, TransportKind};

use crate::error::DispatchError;
use crate::handle::TargetHandle;
use crate::transports::{FileTransport, LogTransport, UdpTransport};

/// Immutable routing table from event identifiers to publish targets.
///
/// Exactly one `TargetHandle` exists per distinct fully-qualified topic
/// name; events resolving to the same topic share the handle (and its
/// underlying publisher connection).
pub struct TargetRegistry {
    /// Topic table: fully-qualified topic name -> target handle
    targets: HashMap<String, Arc<TargetHandle>>,
    /// Event routes: normalized event identifier -> ordered target list
    routes: HashMap<String, Vec<Arc<TargetHandle>>>,
    /// Normalized event identifiers in registration order
    events: Vec<String>,
    /// Identity multicast deliveries are published under
    publisher_id: String,
}

impl TargetRegistry {
    /// Build the registry against an already-constructed transport.
    ///
    /// Fails (and no registry is produced) when the event list is empty or
    /// an event identifier repeats case-insensitively; a publisher creation
    /// failure aborts construction entirely.
    #[instrument(
        name = "target_registry_build",
        skip(blueprint, transport),
        fields(events = blueprint.events.len())
    )]
    pub async fn build<T: Transport>(
        blueprint: &MulticastBlueprint,
        transport: &mut T,
    ) -> Result<Self, DispatchError> {
        if blueprint.events.is_empty() {
            return Err(ContractError::config_validation(
                "events",
                "no multicast events configured",
            )
            .into());
        }

        let publisher_id = blueprint.resolved_publisher_id();
        let mut targets: HashMap<String, Arc<TargetHandle>> = HashMap::new();
        let mut routes: HashMap<String, Vec<Arc<TargetHandle>>> = HashMap::new();
        let mut events = Vec::with_capacity(blueprint.events.len());

        for route in &blueprint.events {
            let event = route.event.to_lowercase();
            if event.is_empty() {
                return Err(ContractError::config_validation(
                    "events[].event",
                    "event identifier cannot be empty",
                )
                .into());
            }
            if routes.contains_key(&event) {
                return Err(ContractError::config_validation(
                    format!("events[event={event}]"),
                    "event defined multiple times",
                )
                .into());
            }

            // Set semantics per event: a repeated suffix registers once,
            // first occurrence wins.
            let mut seen = HashSet::new();
            let mut route_targets = Vec::new();
            for suffix in &route.topics {
                if !seen.insert(suffix.as_str()) {
                    continue;
                }
                let topic = qualified_topic(&blueprint.topic_prefix, suffix, &event);
                let handle = if let Some(existing) = targets.get(&topic) {
                    // Cross-event dedup: an identical fully-qualified name
                    // reuses the existing publisher connection.
                    Arc::clone(existing)
                } else {
                    let publisher = transport
                        .create_publisher(&topic, &publisher_id)
                        .await
                        .map_err(|e| DispatchError::target_creation(&topic, e.to_string()))?;
                    let handle = Arc::new(TargetHandle::spawn(publisher, blueprint.queue_capacity));
                    targets.insert(topic, Arc::clone(&handle));
                    handle
                };
                route_targets.push(handle);
            }

            info!(
                event = %event,
                topics = route_targets.len(),
                "Registered multicast route"
            );
            routes.insert(event.clone(), route_targets);
            events.push(event);
        }

        Ok(Self {
            targets,
            routes,
            events,
            publisher_id,
        })
    }

    /// Construct the configured built-in transport, then build the registry.
    ///
    /// A transport that cannot be constructed is a configuration error and
    /// aborts initialization.
    pub async fn connect(blueprint: &MulticastBlueprint) -> Result<Self, DispatchError> {
        match blueprint.transport.kind {
            TransportKind::Log => {
                let mut transport = LogTransport::new();
                Self::build(blueprint, &mut transport).await
            }
            TransportKind::File => {
                let mut transport = FileTransport::from_params(&blueprint.transport.params)?;
                Self::build(blueprint, &mut transport).await
            }
            TransportKind::Udp => {
                let mut transport = UdpTransport::from_params(&blueprint.transport.params)?;
                Self::build(blueprint, &mut transport).await
            }
        }
    }

    /// Ordered targets registered for an event (empty for unknown events).
    ///
    /// Lookup is case-insensitive on the event identifier.
    pub fn targets_for(&self, event: &str) -> &[Arc<TargetHandle>] {
        self.routes
            .get(&event.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Normalized event identifiers in registration order
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Event routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = (&str, &[Arc<TargetHandle>])> {
        self.events.iter().map(|event| {
            (
                event.as_str(),
                self.routes
                    .get(event)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            )
        })
    }

    /// Number of distinct publish targets
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// All fully-qualified topic names with their handles
    pub fn targets(&self) -> impl Iterator<Item = (&str, &Arc<TargetHandle>)> {
        self.targets.iter().map(|(topic, h)| (topic.as_str(), h))
    }

    /// Identity multicast deliveries are published under
    pub fn publisher_id(&self) -> &str {
        &self.publisher_id
    }

    /// Shutdown all target workers gracefully, draining queued deliveries
    pub async fn shutdown(mut self) {
        // Routes hold the only other references to the handles
        self.routes.clear();
        self.events.clear();
        for (topic, handle) in self.targets.drain() {
            match Arc::try_unwrap(handle) {
                Ok(handle) => handle.shutdown().await,
                Err(_) => warn!(topic = %topic, "Target still referenced, skipping drain"),
            }
        }
    }
}
