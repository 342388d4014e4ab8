// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Property change tracking for composite commands
//!
//! A composite command (create or change) accumulates every property edit made
//! to its target object during a session. Each property appears once: the first
//! edit captures the value observed before it, later edits only move the
//! pending new value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Old/new value pair for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub old_value: Value,
    pub new_value: Value,
}

impl PropertyChange {
    /// True when the edits so far cancel out
    pub fn is_noop(&self) -> bool {
        self.old_value == self.new_value
    }
}

/// Set of pending property deltas of one object, keyed by property id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyChanges {
    changes: BTreeMap<String, PropertyChange>,
}

impl PropertyChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit. `current` is the value the property has right now and
    /// is only kept if this is the first edit of `property`.
    pub fn record(&mut self, property: &str, current: Value, new_value: Value) {
        self.changes
            .entry(property.to_string())
            .and_modify(|change| change.new_value = new_value.clone())
            .or_insert(PropertyChange {
                old_value: current,
                new_value,
            });
    }

    /// Put the delta of `property` back to an earlier state; `None` drops it
    pub(crate) fn restore(&mut self, property: &str, previous: Option<PropertyChange>) {
        match previous {
            Some(change) => {
                self.changes.insert(property.to_string(), change);
            }
            None => {
                self.changes.remove(property);
            }
        }
    }

    pub fn get(&self, property: &str) -> Option<&PropertyChange> {
        self.changes.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.changes.contains_key(property)
    }

    pub fn new_value(&self, property: &str) -> Option<&Value> {
        self.changes.get(property).map(|c| &c.new_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyChange)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Property ids in stable order
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_old_value_and_last_new_value_win() {
        let mut changes = PropertyChanges::new();
        changes.record("source", json!("SELECT 0"), json!("SELECT 1"));
        changes.record("source", json!("SELECT 1"), json!("SELECT 2"));
        changes.record("comment", Value::Null, json!("hello"));

        assert_eq!(changes.len(), 2);
        let source = changes.get("source").unwrap();
        assert_eq!(source.old_value, json!("SELECT 0"));
        assert_eq!(source.new_value, json!("SELECT 2"));
        assert_eq!(changes.properties().collect::<Vec<_>>(), vec!["comment", "source"]);
    }

    #[test]
    fn test_reverting_edit_is_a_noop_delta() {
        let mut changes = PropertyChanges::new();
        changes.record("source", json!("a"), json!("b"));
        changes.record("source", json!("b"), json!("a"));

        assert_eq!(changes.len(), 1);
        assert!(changes.get("source").unwrap().is_noop());
    }

    #[test]
    fn test_restore_puts_back_earlier_delta() {
        let mut changes = PropertyChanges::new();
        changes.record("source", json!("a"), json!("b"));
        let earlier = changes.get("source").cloned();
        changes.record("source", json!("b"), json!("c"));
        changes.record("owner", json!("x"), json!("y"));

        changes.restore("source", earlier);
        changes.restore("owner", None);
        assert_eq!(changes.new_value("source"), Some(&json!("b")));
        assert!(!changes.contains("owner"));
    }
}
