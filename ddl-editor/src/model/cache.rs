// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Per-container object caches

use super::object::ObjectId;
use std::collections::BTreeMap;
use std::fmt;

/// Names one cache of one container, e.g. the `tables` cache of a schema.
///
/// Several object kinds may share a cache (tables and views share one name
/// space in most dialects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheRef {
    pub container: ObjectId,
    pub cache: &'static str,
}

impl CacheRef {
    pub fn new(container: impl Into<ObjectId>, cache: &'static str) -> Self {
        Self {
            container: container.into(),
            cache,
        }
    }
}

impl fmt::Display for CacheRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.cache)
    }
}

/// Name-indexed set of cached objects.
///
/// Keeps insertion order for listing, lookups go through the name index.
#[derive(Debug, Clone, Default)]
pub struct ObjectCache {
    by_name: BTreeMap<String, ObjectId>,
    order: Vec<ObjectId>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the name is already taken
    pub(crate) fn insert(&mut self, name: &str, id: ObjectId) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), id);
        self.order.push(id);
        true
    }

    pub(crate) fn remove(&mut self, name: &str, id: ObjectId) -> bool {
        if self.by_name.get(name) != Some(&id) {
            return false;
        }
        self.by_name.remove(name);
        self.order.retain(|o| *o != id);
        true
    }

    pub(crate) fn rename(&mut self, old_name: &str, new_name: &str, id: ObjectId) -> bool {
        if old_name == new_name {
            return true;
        }
        if self.by_name.contains_key(new_name) || self.by_name.get(old_name) != Some(&id) {
            return false;
        }
        self.by_name.remove(old_name);
        self.by_name.insert(new_name.to_string(), id);
        true
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.order.contains(&id)
    }

    /// Objects in insertion order
    pub fn objects(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_names() {
        let mut cache = ObjectCache::new();
        assert!(cache.insert("a", ObjectId(1)));
        assert!(!cache.insert("a", ObjectId(2)));
        assert_eq!(cache.get("a"), Some(ObjectId(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_rename_moves_name_key() {
        let mut cache = ObjectCache::new();
        cache.insert("a", ObjectId(1));
        cache.insert("b", ObjectId(2));

        assert!(!cache.rename("a", "b", ObjectId(1)));
        assert!(cache.rename("a", "c", ObjectId(1)));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(ObjectId(1)));
        assert_eq!(cache.objects(), &[ObjectId(1), ObjectId(2)]);
    }

    #[test]
    fn test_remove_requires_matching_id() {
        let mut cache = ObjectCache::new();
        cache.insert("a", ObjectId(1));
        assert!(!cache.remove("a", ObjectId(2)));
        assert!(cache.remove("a", ObjectId(1)));
        assert!(cache.is_empty());
    }
}
