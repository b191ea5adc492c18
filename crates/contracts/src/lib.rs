//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Routing Model
//! - Event identifiers are normalized to lower case at registry construction
//! - A fully-qualified topic name is `prefix + suffix + "." + event` and
//!   identifies exactly one publish target

mod blueprint;
mod error;
mod message;
mod priority;
mod publisher;

pub use blueprint::*;
pub use error::*;
pub use message::*;
pub use priority::{Priority, PrioritySet};
pub use publisher::{PrimaryNotifier, Publisher, Transport};
