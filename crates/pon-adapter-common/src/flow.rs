//! Flow-table and group-table payloads.
//!
//! The adapter core only forwards these; matching and action semantics
//! belong to the device handler.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single flow-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEntry {
    pub id: u64,
    #[serde(default)]
    pub table_id: u32,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub cookie: u64,
}

impl FlowEntry {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            table_id: 0,
            priority: 0,
            cookie: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_table(mut self, table_id: u32) -> Self {
        self.table_id = table_id;
        self
    }

    pub fn with_cookie(mut self, cookie: u64) -> Self {
        self.cookie = cookie;
        self
    }
}

/// Ordered flow entries supplied together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flows {
    pub items: Vec<FlowEntry>,
}

impl Flows {
    pub fn new(items: Vec<FlowEntry>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<FlowEntry> for Flows {
    fn from_iter<I: IntoIterator<Item = FlowEntry>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    All,
    Select,
    Indirect,
    FastFailover,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::All => write!(f, "all"),
            GroupType::Select => write!(f, "select"),
            GroupType::Indirect => write!(f, "indirect"),
            GroupType::FastFailover => write!(f, "fast_failover"),
        }
    }
}

impl FromStr for GroupType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(GroupType::All),
            "select" => Ok(GroupType::Select),
            "indirect" => Ok(GroupType::Indirect),
            "fast_failover" | "ff" => Ok(GroupType::FastFailover),
            _ => Err(ParseError::InvalidGroupType(s.to_string())),
        }
    }
}

/// A single group-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupEntry {
    pub group_id: u32,
    pub group_type: GroupType,
}

impl GroupEntry {
    pub fn new(group_id: u32, group_type: GroupType) -> Self {
        Self {
            group_id,
            group_type,
        }
    }
}

/// Ordered group entries supplied alongside [`Flows`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowGroups {
    pub items: Vec<GroupEntry>,
}

impl FlowGroups {
    pub fn new(items: Vec<GroupEntry>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Incremental flow-table delta.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowChanges {
    #[serde(default)]
    pub to_add: Flows,
    #[serde(default)]
    pub to_remove: Flows,
}

/// Incremental group-table delta.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowGroupChanges {
    #[serde(default)]
    pub to_add: FlowGroups,
    #[serde(default)]
    pub to_remove: FlowGroups,
    #[serde(default)]
    pub to_update: FlowGroups,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flows_collect_preserves_order() {
        let flows: Flows = (1..=3).map(|id| FlowEntry::new(id).with_priority(1000)).collect();
        assert_eq!(flows.len(), 3);
        let ids: Vec<u64> = flows.items.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_group_type_parse() {
        assert_eq!("ff".parse::<GroupType>().unwrap(), GroupType::FastFailover);
        assert_eq!(GroupType::Select.to_string(), "select");
        assert!("broadcast".parse::<GroupType>().is_err());
    }

    #[test]
    fn test_flow_changes_default_empty() {
        let changes = FlowGroupChanges::default();
        assert!(changes.to_add.is_empty());
        assert!(changes.to_remove.is_empty());
        assert!(changes.to_update.is_empty());
    }
}
