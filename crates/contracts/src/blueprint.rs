//! MulticastBlueprint - Config Loader output
//!
//! Describes the complete multicast routing configuration: publisher
//! identity, topic prefix, event routes, transport, queue sizing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete multicast routing blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticastBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Publisher identity stamped on multicast deliveries.
    /// Defaults to `{hostname}-MULTICAST` when absent.
    #[serde(default)]
    pub publisher_id: Option<String>,

    /// Prefix prepended to every fully-qualified topic name
    #[serde(default)]
    pub topic_prefix: String,

    /// Ordered event routes
    pub events: Vec<EventRouteConfig>,

    /// Transport shared by every publish target
    #[serde(default)]
    pub transport: TransportConfig,

    /// Per-target queue depth
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Retry hint passed through to the primary delivery path
    #[serde(default)]
    pub retry: Option<u32>,
}

/// One event route: an event identifier and its topic suffixes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRouteConfig {
    /// Event identifier (matched case-insensitively)
    pub event: String,

    /// Topic suffixes to multicast on (duplicates collapse)
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport kind
    pub kind: TransportKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Log,
            params: HashMap::new(),
        }
    }
}

/// Transport kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Structured-log emission
    Log,
    /// Per-topic JSON-lines files
    File,
    /// UDP datagrams
    Udp,
}

fn default_queue_capacity() -> usize {
    100
}

/// Fully-qualified topic name for one (prefix, suffix, event) triple
pub fn qualified_topic(prefix: &str, suffix: &str, event: &str) -> String {
    format!("{prefix}{suffix}.{event}")
}

impl MulticastBlueprint {
    /// Publisher identity: the configured value, or one derived from the
    /// host name when none is set.
    pub fn resolved_publisher_id(&self) -> String {
        if let Some(id) = &self.publisher_id {
            return id.clone();
        }
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        format!("{host}-MULTICAST")
    }

    /// Normalized event routes with deduplicated fully-qualified topic
    /// names, in configuration order.
    ///
    /// Purely derived view for diagnostics; event uniqueness is enforced at
    /// registry construction, not here.
    pub fn resolved_routes(&self) -> Vec<(String, Vec<String>)> {
        self.events
            .iter()
            .map(|route| {
                let event = route.event.to_lowercase();
                let mut seen = std::collections::HashSet::new();
                let topics = route
                    .topics
                    .iter()
                    .filter(|suffix| seen.insert(suffix.as_str()))
                    .map(|suffix| qualified_topic(&self.topic_prefix, suffix, &event))
                    .collect();
                (event, topics)
            })
            .collect()
    }
}
