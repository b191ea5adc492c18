//! # Dispatcher
//!
//! Multicast dispatch module.
//!
//! Responsible for:
//! - Building the event -> publish-target routing table from configuration
//! - Filtering inbound notifications and fanning out to matched targets
//! - Isolating slow or failing targets from the primary delivery path

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod primary;
pub mod registry;
pub mod transports;

pub use contracts::{Notification, Priority, Publisher, Transport};
pub use dispatcher::{create_dispatcher, MulticastDispatcher};
pub use error::DispatchError;
pub use handle::TargetHandle;
pub use metrics::{MetricsSnapshot, TargetMetrics};
pub use primary::TracingPrimary;
pub use registry::TargetRegistry;
pub use transports::{FileTransport, LogTransport, UdpTransport};
