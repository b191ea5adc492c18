//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Publish target creation error
    #[error("failed to create target '{topic}': {message}")]
    TargetCreation { topic: String, message: String },

    /// Queue full - delivery dropped
    #[error("queue full for target '{topic}', message {message_id} dropped")]
    QueueFull { topic: String, message_id: String },

    /// Contract-level error (configuration, transport)
    #[error("{0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Create a target creation error
    pub fn target_creation(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TargetCreation {
            topic: topic.into(),
            message: message.into(),
        }
    }
}
