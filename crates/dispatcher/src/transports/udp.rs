//! UdpTransport - UDP fire-and-forget delivery

use std::collections::HashMap;
use std::net::SocketAddr;

use contracts::{ContractError, Delivery, PrioritySet, Publisher, Transport};
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for UdpTransport
#[derive(Debug, Clone)]
pub struct UdpTransportConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Max packet size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl UdpTransportConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => WireFormat::Bincode,
            Some("json") | None => WireFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Transport whose publishers send datagrams to one peer address
pub struct UdpTransport {
    config: UdpTransportConfig,
}

impl UdpTransport {
    /// Create a new UdpTransport
    pub fn new(config: UdpTransportConfig) -> Self {
        Self { config }
    }

    /// Create from params map (for factory)
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ContractError> {
        let config = UdpTransportConfig::from_params(params)
            .map_err(|e| ContractError::transport_connection("udp", e))?;
        Ok(Self::new(config))
    }
}

impl Transport for UdpTransport {
    type Publisher = UdpPublisher;

    #[instrument(name = "udp_transport_create_publisher", skip(self, _publisher_id))]
    async fn create_publisher(
        &mut self,
        topic: &str,
        _publisher_id: &str,
    ) -> Result<UdpPublisher, ContractError> {
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| ContractError::transport_connection("udp", e.to_string()))?;
        socket
            .connect(&self.config.addr)
            .await
            .map_err(|e| ContractError::transport_connection("udp", e.to_string()))?;

        debug!(
            topic = %topic,
            target = %self.config.addr,
            "UdpPublisher connected"
        );

        Ok(UdpPublisher {
            topic: topic.to_string(),
            format: self.config.format,
            max_packet_size: self.config.max_packet_size,
            socket: Some(socket),
        })
    }
}

/// Publisher that sends deliveries over UDP.
///
/// The multicast publisher identity travels inside each serialized
/// `Delivery`, so the publisher itself only retains the topic.
pub struct UdpPublisher {
    topic: String,
    format: WireFormat,
    max_packet_size: usize,
    socket: Option<UdpSocket>,
}

impl UdpPublisher {
    fn serialize_delivery(&self, delivery: &Delivery) -> Result<Vec<u8>, String> {
        match self.format {
            WireFormat::Json => {
                serde_json::to_vec(delivery).map_err(|e| format!("json error: {}", e))
            }
            WireFormat::Bincode => {
                bincode::serialize(delivery).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::publish_failed(&self.topic, "socket not connected"))
    }

    fn prepare_payload(&self, delivery: &Delivery) -> Result<Vec<u8>, ContractError> {
        let data = self
            .serialize_delivery(delivery)
            .map_err(|e| ContractError::publish_failed(&self.topic, e))?;

        if data.len() > self.max_packet_size {
            warn!(
                topic = %self.topic,
                size = data.len(),
                max = self.max_packet_size,
                "Packet too large, truncating"
            );
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], message_id: &str) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(topic = %self.topic, message_id, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(topic = %self.topic, error = %e, "UDP send failed");
            }
        }
    }
}

impl Publisher for UdpPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn capabilities(&self) -> PrioritySet {
        PrioritySet::all()
    }

    #[instrument(
        name = "udp_publisher_deliver",
        skip(self, delivery),
        fields(topic = %self.topic, message_id = %delivery.message.message_id)
    )]
    async fn deliver(&mut self, delivery: &Delivery) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(delivery)?;
        self.transmit(socket, &data, &delivery.message.message_id)
            .await;
        Ok(())
    }

    #[instrument(name = "udp_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(topic = %self.topic, "UdpPublisher closed");
        Ok(())
    }
}
