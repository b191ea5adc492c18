//! Notification message model
//!
//! A `Notification` is treated as read-only by the dispatch layer; only the
//! four addressable attributes participate in multicast filtering.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Priority;

/// Caller-supplied request context propagated with every delivery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

/// One outbound notification message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique message identifier
    pub message_id: String,

    /// Identity of the emitting service
    pub publisher_id: String,

    /// Event type (e.g., "image.upload")
    pub event_type: String,

    /// Severity the message was emitted at
    pub priority: Priority,

    /// Emission time (UTC)
    #[serde(default = "default_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Arbitrary structured body
    #[serde(default)]
    pub payload: serde_json::Value,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl Notification {
    /// Construct a notification stamped with the current time and an empty
    /// payload.
    pub fn new(
        message_id: impl Into<String>,
        publisher_id: impl Into<String>,
        event_type: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            publisher_id: publisher_id.into(),
            event_type: event_type.into(),
            priority,
            timestamp: Utc::now(),
            payload: serde_json::Value::Null,
        }
    }

    /// Lower-cased values of the addressable attributes.
    ///
    /// This is the multicast match surface: any of these values may equal a
    /// registered event identifier, not just `event_type`.
    pub fn filter_keys(&self) -> [String; 4] {
        [
            self.event_type.to_lowercase(),
            self.priority.as_str().to_string(),
            self.message_id.to_lowercase(),
            self.publisher_id.to_lowercase(),
        ]
    }
}

/// Envelope handed to a publish target for one matched event
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    /// Request context from the producer
    pub context: Context,

    /// The registered event identifier that matched (normalized form)
    pub event_type: String,

    /// Delivery operation to use
    pub priority: Priority,

    /// Identity the multicast is published under (not the producer's)
    pub publisher_id: String,

    /// Full message body
    pub message: Notification,
}

/// Acknowledgement returned by the primary delivery path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub message_id: String,
}
