//! Publisher traits - Dispatcher output interfaces
//!
//! Defines the abstract interfaces for the transport collaborators.

use crate::{ContractError, Context, Delivery, Notification, Priority, PrioritySet, Receipt};

/// Transport-level publish target bound to one fully-qualified topic.
///
/// All transport implementations must implement this trait.
#[trait_variant::make(Publisher: Send)]
pub trait LocalPublisher {
    /// Fully-qualified topic this publisher delivers to
    fn topic(&self) -> &str;

    /// Priorities this publisher exposes a delivery operation for
    fn capabilities(&self) -> PrioritySet;

    /// Deliver one matched notification
    ///
    /// # Errors
    /// Returns delivery error (should include topic context)
    async fn deliver(&mut self, delivery: &Delivery) -> Result<(), ContractError>;

    /// Close the publisher, releasing transport resources
    async fn close(&mut self) -> Result<(), ContractError>;
}

/// Factory for publishers, one per distinct fully-qualified topic.
///
/// Constructing the transport itself (connecting, binding) happens before
/// registry construction; failure there aborts initialization entirely.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    type Publisher: Publisher + Send + 'static;

    /// Construct a publisher bound to `topic`, publishing as `publisher_id`
    async fn create_publisher(
        &mut self,
        topic: &str,
        publisher_id: &str,
    ) -> Result<Self::Publisher, ContractError>;
}

/// The primary (non-multicast) delivery path.
///
/// Multicast is additive: the dispatcher always delegates here first and
/// returns this result to the caller unchanged.
#[trait_variant::make(PrimaryNotifier: Send)]
pub trait LocalPrimaryNotifier {
    async fn notify(
        &self,
        ctxt: &Context,
        msg: &Notification,
        priority: Priority,
        retry: Option<u32>,
    ) -> Result<Receipt, ContractError>;
}
