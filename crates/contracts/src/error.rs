//! Layered error definitions
//!
//! Categorized by source: config / transport / dispatch

use thiserror::Error;

use crate::Priority;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Transport could not be constructed or connected
    #[error("transport '{transport}' connection error: {message}")]
    TransportConnection { transport: String, message: String },

    /// Delivery to a publish target failed
    #[error("publish to '{topic}' failed: {message}")]
    PublishFailed { topic: String, message: String },

    /// Target exposes no delivery operation for the requested priority
    #[error("target '{topic}' does not support priority '{priority}'")]
    UnsupportedPriority { topic: String, priority: Priority },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport connection error
    pub fn transport_connection(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportConnection {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create publish failure error
    pub fn publish_failed(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublishFailed {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create unsupported priority error
    pub fn unsupported_priority(topic: impl Into<String>, priority: Priority) -> Self {
        Self::UnsupportedPriority {
            topic: topic.into(),
            priority,
        }
    }
}
