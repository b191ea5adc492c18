//! FileTransport - appends deliveries to per-topic JSON-lines files

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use contracts::{ContractError, Delivery, PrioritySet, Publisher, Transport};
use tracing::{debug, instrument};

/// Configuration for FileTransport
#[derive(Debug, Clone)]
pub struct FileTransportConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileTransportConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./multicast-out"));

        Self { base_path }
    }
}

/// Transport whose publishers append to `<base_path>/<topic>.jsonl`
pub struct FileTransport {
    config: FileTransportConfig,
}

impl FileTransport {
    /// Create a new FileTransport, creating the base directory
    pub fn new(config: FileTransportConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;
        Ok(Self { config })
    }

    /// Create from params map (for factory)
    pub fn from_params(params: &HashMap<String, String>) -> std::io::Result<Self> {
        Self::new(FileTransportConfig::from_params(params))
    }
}

impl Transport for FileTransport {
    type Publisher = FilePublisher;

    async fn create_publisher(
        &mut self,
        topic: &str,
        _publisher_id: &str,
    ) -> Result<FilePublisher, ContractError> {
        let path = self.config.base_path.join(format!("{topic}.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                ContractError::transport_connection("file", format!("{}: {e}", path.display()))
            })?;

        debug!(topic = %topic, path = %path.display(), "FilePublisher opened");

        Ok(FilePublisher {
            topic: topic.to_string(),
            file,
        })
    }
}

/// Publisher that appends one JSON line per delivery.
///
/// The multicast publisher identity travels inside each serialized
/// `Delivery`, so the publisher itself only retains the topic.
pub struct FilePublisher {
    topic: String,
    file: File,
}

impl Publisher for FilePublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn capabilities(&self) -> PrioritySet {
        PrioritySet::all()
    }

    #[instrument(
        name = "file_publisher_deliver",
        skip(self, delivery),
        fields(topic = %self.topic, message_id = %delivery.message.message_id)
    )]
    async fn deliver(&mut self, delivery: &Delivery) -> Result<(), ContractError> {
        let line = serde_json::to_vec(delivery)
            .map_err(|e| ContractError::publish_failed(&self.topic, e.to_string()))?;
        self.file.write_all(&line)?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    #[instrument(name = "file_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.file.flush()?;
        debug!(topic = %self.topic, "FilePublisher closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Context, Notification, Priority};
    use std::io::BufRead;

    fn sample_delivery(n: u64) -> Delivery {
        Delivery {
            context: Context::default(),
            event_type: "image.upload".to_string(),
            priority: Priority::Info,
            publisher_id: "svc-MULTICAST".to_string(),
            message: Notification::new(format!("m{n}"), "svc", "image.upload", Priority::Info),
        }
    }

    #[tokio::test]
    async fn test_file_publisher_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "base_path".to_string(),
            dir.path().to_string_lossy().to_string(),
        );

        let mut transport = FileTransport::from_params(&params).unwrap();
        let mut publisher = transport
            .create_publisher("repl.host1.image.upload", "svc")
            .await
            .unwrap();

        publisher.deliver(&sample_delivery(1)).await.unwrap();
        publisher.deliver(&sample_delivery(2)).await.unwrap();
        publisher.close().await.unwrap();

        let path = dir.path().join("repl.host1.image.upload.jsonl");
        let file = File::open(path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["event_type"], "image.upload");
        assert_eq!(value["message"]["message_id"], "m1");
    }

    #[tokio::test]
    async fn test_file_transport_creates_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = FileTransportConfig {
            base_path: nested.clone(),
        };
        let _transport = FileTransport::new(config).unwrap();
        assert!(nested.is_dir());
    }
}
