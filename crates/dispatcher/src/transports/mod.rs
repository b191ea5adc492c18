//! Transport implementations
//!
//! Contains LogTransport, FileTransport, and UdpTransport.

mod file;
mod log;
mod udp;

pub use self::file::{FilePublisher, FileTransport};
pub use self::log::{LogPublisher, LogTransport};
pub use self::udp::{UdpPublisher, UdpTransport, WireFormat};
