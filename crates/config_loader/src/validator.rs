//! Configuration validation
//!
//! Rules:
//! - at least one event configured
//! - event identifiers unique (case-insensitive)
//! - event identifiers and topic suffixes non-empty
//! - queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, MulticastBlueprint};

/// Validate a MulticastBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &MulticastBlueprint) -> Result<(), ContractError> {
    validate_events_present(blueprint)?;
    validate_event_ids(blueprint)?;
    validate_topics(blueprint)?;
    validate_queue_capacity(blueprint)?;
    Ok(())
}

/// The event list must not be empty
fn validate_events_present(blueprint: &MulticastBlueprint) -> Result<(), ContractError> {
    if blueprint.events.is_empty() {
        return Err(ContractError::config_validation(
            "events",
            "no multicast events configured",
        ));
    }
    Ok(())
}

/// Event identifiers must be non-empty and unique (case-insensitive)
fn validate_event_ids(blueprint: &MulticastBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for route in &blueprint.events {
        if route.event.is_empty() {
            return Err(ContractError::config_validation(
                "events[].event",
                "event identifier cannot be empty",
            ));
        }
        if !seen.insert(route.event.to_lowercase()) {
            return Err(ContractError::config_validation(
                format!("events[event={}]", route.event),
                "event defined multiple times",
            ));
        }
    }
    Ok(())
}

/// Topic suffixes must be non-empty strings
fn validate_topics(blueprint: &MulticastBlueprint) -> Result<(), ContractError> {
    for route in &blueprint.events {
        for (idx, topic) in route.topics.iter().enumerate() {
            if topic.is_empty() {
                return Err(ContractError::config_validation(
                    format!("events[event={}].topics[{}]", route.event, idx),
                    "topic suffix cannot be empty",
                ));
            }
        }
    }
    Ok(())
}

/// Queue capacity must leave room for at least one delivery
fn validate_queue_capacity(blueprint: &MulticastBlueprint) -> Result<(), ContractError> {
    if blueprint.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "queue_capacity",
            "queue_capacity must be > 0",
        ));
    }
    Ok(())
}
