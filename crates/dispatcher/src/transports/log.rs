//! LogTransport - emits deliveries through tracing

use contracts::{ContractError, Delivery, Priority, PrioritySet, Publisher, Transport};
use tracing::{info, instrument};

/// Transport whose publishers log delivery summaries
#[derive(Debug, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for LogTransport {
    type Publisher = LogPublisher;

    async fn create_publisher(
        &mut self,
        topic: &str,
        publisher_id: &str,
    ) -> Result<LogPublisher, ContractError> {
        Ok(LogPublisher {
            topic: topic.to_string(),
            publisher_id: publisher_id.to_string(),
        })
    }
}

/// Publisher that logs each delivery for debugging
pub struct LogPublisher {
    topic: String,
    publisher_id: String,
}

impl Publisher for LogPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    /// No `sample` operation: sampled emission needs rate state this
    /// transport does not keep
    fn capabilities(&self) -> PrioritySet {
        PrioritySet::all().without(Priority::Sample)
    }

    #[instrument(
        name = "log_publisher_deliver",
        skip(self, delivery),
        fields(topic = %self.topic, message_id = %delivery.message.message_id)
    )]
    async fn deliver(&mut self, delivery: &Delivery) -> Result<(), ContractError> {
        info!(
            topic = %self.topic,
            publisher = %self.publisher_id,
            event = %delivery.event_type,
            priority = %delivery.priority,
            message_id = %delivery.message.message_id,
            "Notification multicast"
        );
        Ok(())
    }

    #[instrument(name = "log_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(topic = %self.topic, "LogPublisher closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Context, Notification};

    fn sample_delivery() -> Delivery {
        Delivery {
            context: Context::default(),
            event_type: "image.upload".to_string(),
            priority: Priority::Info,
            publisher_id: "svc-MULTICAST".to_string(),
            message: Notification::new("m1", "svc", "image.upload", Priority::Info),
        }
    }

    #[tokio::test]
    async fn test_log_publisher_deliver() {
        let mut transport = LogTransport::new();
        let mut publisher = transport
            .create_publisher("repl.host1.image.upload", "svc-MULTICAST")
            .await
            .unwrap();
        assert_eq!(publisher.topic(), "repl.host1.image.upload");

        let result = publisher.deliver(&sample_delivery()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_publisher_has_no_sample_operation() {
        let mut transport = LogTransport::new();
        let publisher = transport.create_publisher("t", "p").await.unwrap();
        assert!(!publisher.capabilities().contains(Priority::Sample));
        assert!(publisher.capabilities().contains(Priority::Critical));
    }
}
