//! Priority vocabulary and the typed capability set
//!
//! Priorities mirror the delivery operations of the underlying transport.
//! A target advertises the operations it supports as a `PrioritySet`;
//! unsupported combinations are decided by set membership, never by probing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Severity level of a notification, naming the delivery operation used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Audit,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
    Sample,
}

impl Priority {
    /// Every priority, in severity order
    pub const ALL: [Priority; 7] = [
        Priority::Audit,
        Priority::Debug,
        Priority::Info,
        Priority::Warn,
        Priority::Error,
        Priority::Critical,
        Priority::Sample,
    ];

    /// Lower-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Audit => "audit",
            Priority::Debug => "debug",
            Priority::Info => "info",
            Priority::Warn => "warn",
            Priority::Error => "error",
            Priority::Critical => "critical",
            Priority::Sample => "sample",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ContractError;

    /// Case-insensitive; accepts the `warning` alias
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audit" => Ok(Priority::Audit),
            "debug" => Ok(Priority::Debug),
            "info" => Ok(Priority::Info),
            "warn" | "warning" => Ok(Priority::Warn),
            "error" => Ok(Priority::Error),
            "critical" => Ok(Priority::Critical),
            "sample" => Ok(Priority::Sample),
            other => Err(ContractError::config_validation(
                "priority",
                format!("unknown priority '{other}'"),
            )),
        }
    }
}

/// Set of priorities a publish target exposes delivery operations for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrioritySet(u8);

impl PrioritySet {
    /// The empty set
    pub const EMPTY: PrioritySet = PrioritySet(0);

    /// Set containing every priority
    pub const fn all() -> Self {
        let mut set = PrioritySet(0);
        let mut i = 0;
        while i < Priority::ALL.len() {
            set.0 |= Priority::ALL[i].bit();
            i += 1;
        }
        set
    }

    /// Set built from a priority list
    pub const fn of(priorities: &[Priority]) -> Self {
        let mut set = PrioritySet(0);
        let mut i = 0;
        while i < priorities.len() {
            set.0 |= priorities[i].bit();
            i += 1;
        }
        set
    }

    /// Copy of this set with `priority` added
    pub const fn with(self, priority: Priority) -> Self {
        PrioritySet(self.0 | priority.bit())
    }

    /// Copy of this set with `priority` removed
    pub const fn without(self, priority: Priority) -> Self {
        PrioritySet(self.0 & !priority.bit())
    }

    /// Whether `priority` is a member
    pub const fn contains(self, priority: Priority) -> bool {
        self.0 & priority.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in severity order
    pub fn iter(self) -> impl Iterator<Item = Priority> {
        Priority::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("INFO".parse::<Priority>().unwrap(), Priority::Info);
        assert_eq!("Critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("warning".parse::<Priority>().unwrap(), Priority::Warn);
        assert!("fatal".parse::<Priority>().is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Priority::Warn.to_string(), "warn");
        assert_eq!(Priority::Audit.to_string(), "audit");
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Priority::Error).unwrap(), "\"error\"");
        let p: Priority = serde_json::from_str("\"sample\"").unwrap();
        assert_eq!(p, Priority::Sample);
    }

    #[test]
    fn test_set_membership() {
        let set = PrioritySet::of(&[Priority::Info, Priority::Error]);
        assert!(set.contains(Priority::Info));
        assert!(set.contains(Priority::Error));
        assert!(!set.contains(Priority::Debug));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_with_without() {
        let set = PrioritySet::all().without(Priority::Sample);
        assert_eq!(set.len(), Priority::ALL.len() - 1);
        assert!(!set.contains(Priority::Sample));
        assert!(set.with(Priority::Sample).contains(Priority::Sample));
    }

    #[test]
    fn test_set_iter_order() {
        let set = PrioritySet::of(&[Priority::Critical, Priority::Audit]);
        let members: Vec<_> = set.iter().collect();
        assert_eq!(members, vec![Priority::Audit, Priority::Critical]);
    }

    #[test]
    fn test_empty_set() {
        assert!(PrioritySet::EMPTY.is_empty());
        assert_eq!(PrioritySet::EMPTY.iter().count(), 0);
    }
}
