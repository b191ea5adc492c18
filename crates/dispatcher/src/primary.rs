//! Primary delivery path
//!
//! The dispatcher delegates every message here before any multicast
//! fan-out; the result is returned to the caller unchanged.

use tracing::{info, instrument};

use contracts::{ContractError, Context, Notification, PrimaryNotifier, Priority, Receipt};

/// Primary notifier that records the message through tracing.
///
/// Stands in for the host pipeline's standard delivery channel when the
/// dispatcher is run outside a full messaging stack.
#[derive(Debug, Default)]
pub struct TracingPrimary;

impl TracingPrimary {
    pub fn new() -> Self {
        Self
    }
}

impl PrimaryNotifier for TracingPrimary {
    #[instrument(
        name = "primary_notify",
        skip(self, _ctxt, msg),
        fields(message_id = %msg.message_id)
    )]
    async fn notify(
        &self,
        _ctxt: &Context,
        msg: &Notification,
        priority: Priority,
        retry: Option<u32>,
    ) -> Result<Receipt, ContractError> {
        info!(
            message_id = %msg.message_id,
            event_type = %msg.event_type,
            priority = %priority,
            retry = ?retry,
            "Notification delivered"
        );
        Ok(Receipt {
            message_id: msg.message_id.clone(),
        })
    }
}
