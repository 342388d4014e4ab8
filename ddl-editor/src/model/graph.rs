// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory object graph
//!
//! The graph is the live metadata model the framework edits. Objects are kept
//! in an arena keyed by [`ObjectId`]; container membership is expressed by
//! per-container [`ObjectCache`]s. Removing an object from its cache detaches
//! it without dropping the record, so a delete can be undone and a dropped
//! object can still be described by the DDL that drops it.
//!
//! Every mutation that changes what a reader of the tree would observe is
//! published as a [`ModelEvent`] to all subscribers.

use super::cache::{CacheRef, ObjectCache};
use super::object::{
    Database, DatabaseObject, Handle, ObjectId, ObjectKind, ObjectType, NAME_PROPERTY,
};
use crate::error::{EditorError, EditorResult};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Change notification published by the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    ObjectAdded { id: ObjectId, kind: ObjectKind },
    ObjectRemoved { id: ObjectId, kind: ObjectKind },
    ObjectUpdated { id: ObjectId, kind: ObjectKind },
}

impl ModelEvent {
    pub fn object(&self) -> ObjectId {
        match self {
            ModelEvent::ObjectAdded { id, .. }
            | ModelEvent::ObjectRemoved { id, .. }
            | ModelEvent::ObjectUpdated { id, .. } => *id,
        }
    }
}

/// Arena of database objects plus their containers' caches
#[derive(Debug)]
pub struct ObjectGraph {
    objects: HashMap<ObjectId, DatabaseObject>,
    caches: HashMap<CacheRef, ObjectCache>,
    root: ObjectId,
    next_id: u64,
    subscribers: Vec<Sender<ModelEvent>>,
}

impl ObjectGraph {
    /// Create a graph whose root is a persisted database object
    pub fn new(database_name: &str) -> Self {
        let root = ObjectId(1);
        let mut objects = HashMap::new();
        objects.insert(
            root,
            DatabaseObject {
                id: root,
                kind: ObjectKind::Database,
                name: database_name.to_string(),
                container: None,
                persisted: true,
                properties: BTreeMap::new(),
                cache: None,
            },
        );

        Self {
            objects,
            caches: HashMap::new(),
            root,
            next_id: 2,
            subscribers: Vec::new(),
        }
    }

    pub fn root(&self) -> Handle<Database> {
        Handle::new_unchecked(self.root)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, id: ObjectId) -> Option<&DatabaseObject> {
        self.objects.get(&id)
    }

    /// Like [`object`](Self::object) but fails with `ObjectNotFound`
    pub fn get(&self, id: ObjectId) -> EditorResult<&DatabaseObject> {
        self.objects.get(&id).ok_or(EditorError::ObjectNotFound(id))
    }

    fn get_mut(&mut self, id: ObjectId) -> EditorResult<&mut DatabaseObject> {
        self.objects
            .get_mut(&id)
            .ok_or(EditorError::ObjectNotFound(id))
    }

    pub fn kind_of(&self, id: ObjectId) -> EditorResult<ObjectKind> {
        Ok(self.get(id)?.kind)
    }

    /// Checked cast of an untyped id to a typed handle
    pub fn handle<T: ObjectType>(&self, id: ObjectId) -> EditorResult<Handle<T>> {
        let kind = self.kind_of(id)?;
        if kind != T::KIND {
            return Err(EditorError::InvalidOperation(format!(
                "object {} is a {}, not a {}",
                id,
                kind,
                T::KIND
            )));
        }
        Ok(Handle::new_unchecked(id))
    }

    /// Allocate a new, unpersisted object of kind `T` inside `container`.
    ///
    /// The object is not placed in any cache; that is the job of the create
    /// reflector once a create command is registered.
    pub fn create_object<T: ObjectType>(
        &mut self,
        container: ObjectId,
        name: &str,
    ) -> EditorResult<Handle<T>> {
        self.get(container)?;

        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            DatabaseObject {
                id,
                kind: T::KIND,
                name: name.to_string(),
                container: Some(container),
                persisted: false,
                properties: BTreeMap::new(),
                cache: None,
            },
        );
        log::debug!("Allocated {} '{}' as {}", T::KIND, name, id);
        Ok(Handle::new_unchecked(id))
    }

    /// Allocate a new object carrying a copy of `source`'s properties
    pub fn copy_object<T: ObjectType>(
        &mut self,
        source: Handle<T>,
        container: ObjectId,
        name: &str,
    ) -> EditorResult<Handle<T>> {
        let properties = self.get(source.id())?.properties.clone();
        let handle = self.create_object::<T>(container, name)?;
        self.get_mut(handle.id())?.properties = properties;
        Ok(handle)
    }

    /// Register an object that already exists in the database: persisted and
    /// cached. Used when loading metadata.
    pub fn load_object<T: ObjectType>(
        &mut self,
        container: ObjectId,
        cache: &'static str,
        name: &str,
    ) -> EditorResult<Handle<T>> {
        let handle = self.create_object::<T>(container, name)?;
        self.get_mut(handle.id())?.persisted = true;
        self.insert_into_cache(CacheRef::new(container, cache), handle.id())?;
        Ok(handle)
    }

    /// Drop an unpersisted object that sits in no cache, such as a new object
    /// whose create command could not be registered
    pub fn discard_object(&mut self, id: ObjectId) -> EditorResult<()> {
        let object = self.get(id)?;
        if object.persisted || object.cache.is_some() {
            return Err(EditorError::InvalidOperation(format!(
                "{} '{}' is part of the model and cannot be discarded",
                object.kind, object.name
            )));
        }
        if let Some(object) = self.objects.remove(&id) {
            log::debug!("Discarded {} '{}' ({})", object.kind, object.name, id);
        }
        Ok(())
    }

    pub fn cache(&self, cache: &CacheRef) -> Option<&ObjectCache> {
        self.caches.get(cache)
    }

    /// Place an object into a cache. Re-inserting into the same cache is a no-op.
    pub fn insert_into_cache(&mut self, cache: CacheRef, id: ObjectId) -> EditorResult<()> {
        let (name, kind, current) = {
            let object = self.get(id)?;
            (object.name.clone(), object.kind, object.cache)
        };
        if current == Some(cache) {
            return Ok(());
        }
        if let Some(previous) = current {
            self.detach(previous, &name, id);
        }

        if !self.caches.entry(cache).or_default().insert(&name, id) {
            return Err(EditorError::DuplicateObject(format!(
                "{} '{}' already exists in {}",
                kind, name, cache
            )));
        }
        self.get_mut(id)?.cache = Some(cache);
        log::debug!("Cached {} '{}' in {}", kind, name, cache);

        self.fire(ModelEvent::ObjectAdded { id, kind });
        Ok(())
    }

    /// Detach an object from its cache, returning the cache it was in
    pub fn remove_from_cache(&mut self, id: ObjectId) -> EditorResult<Option<CacheRef>> {
        let (name, kind, current) = {
            let object = self.get(id)?;
            (object.name.clone(), object.kind, object.cache)
        };
        let Some(cache) = current else {
            return Ok(None);
        };

        self.detach(cache, &name, id);
        self.get_mut(id)?.cache = None;
        log::debug!("Removed {} '{}' from {}", kind, name, cache);

        self.fire(ModelEvent::ObjectRemoved { id, kind });
        Ok(Some(cache))
    }

    fn detach(&mut self, cache: CacheRef, name: &str, id: ObjectId) {
        if let Some(entries) = self.caches.get_mut(&cache) {
            entries.remove(name, id);
        }
    }

    /// Cached children of a container, grouped by cache name
    pub fn children(&self, container: ObjectId) -> Vec<ObjectId> {
        let mut caches: Vec<&CacheRef> = self
            .caches
            .keys()
            .filter(|c| c.container == container)
            .collect();
        caches.sort();
        caches
            .into_iter()
            .flat_map(|c| self.caches[c].objects().iter().copied())
            .collect()
    }

    /// Cached children of a container that are of kind `T`
    pub fn children_of<T: ObjectType>(&self, container: ObjectId) -> Vec<Handle<T>> {
        self.children(container)
            .into_iter()
            .filter(|id| self.objects.get(id).map(|o| o.kind) == Some(T::KIND))
            .map(Handle::new_unchecked)
            .collect()
    }

    pub fn find_child(&self, container: ObjectId, name: &str) -> Option<ObjectId> {
        let mut caches: Vec<&CacheRef> = self
            .caches
            .keys()
            .filter(|c| c.container == container)
            .collect();
        caches.sort();
        caches.into_iter().find_map(|c| self.caches[c].get(name))
    }

    /// Resolve a name path starting below the root, e.g. `["public", "v1"]`
    pub fn resolve_path(&self, path: &[&str]) -> Option<ObjectId> {
        path.iter()
            .try_fold(self.root, |container, name| self.find_child(container, name))
    }

    /// Pick a name not yet used in `cache`: `base`, `base2`, `base3`, ...
    pub fn unique_name(&self, cache: &CacheRef, base: &str) -> String {
        let Some(entries) = self.caches.get(cache) else {
            return base.to_string();
        };
        if entries.get(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| entries.get(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Rename an object, keeping its cache's name index consistent
    pub fn set_name(&mut self, id: ObjectId, new_name: &str) -> EditorResult<()> {
        let (old_name, kind, cache) = {
            let object = self.get(id)?;
            (object.name.clone(), object.kind, object.cache)
        };
        if old_name == new_name {
            return Ok(());
        }
        if let Some(cache) = cache {
            let renamed = self
                .caches
                .get_mut(&cache)
                .map(|entries| entries.rename(&old_name, new_name, id))
                .unwrap_or(true);
            if !renamed {
                return Err(EditorError::DuplicateObject(format!(
                    "{} '{}' already exists in {}",
                    kind, new_name, cache
                )));
            }
        }
        self.get_mut(id)?.name = new_name.to_string();
        Ok(())
    }

    pub fn property(&self, id: ObjectId, property: &str) -> EditorResult<Value> {
        Ok(self.get(id)?.property(property))
    }

    /// Write a property value. `name` renames the object, `Null` clears the property.
    pub fn set_property(&mut self, id: ObjectId, property: &str, value: Value) -> EditorResult<()> {
        if property == NAME_PROPERTY {
            let Value::String(name) = value else {
                return Err(EditorError::InvalidOperation(format!(
                    "object name must be a string, got {}",
                    value
                )));
            };
            return self.set_name(id, &name);
        }

        let object = self.get_mut(id)?;
        if value.is_null() {
            object.properties.remove(property);
        } else {
            object.properties.insert(property.to_string(), value);
        }
        Ok(())
    }

    pub fn set_persisted(&mut self, id: ObjectId, persisted: bool) -> EditorResult<()> {
        self.get_mut(id)?.persisted = persisted;
        Ok(())
    }

    /// Subscribe to model change notifications
    pub fn subscribe(&mut self) -> Receiver<ModelEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Announce that an object's observable state changed
    pub fn fire_object_update(&mut self, id: ObjectId) -> EditorResult<()> {
        let kind = self.kind_of(id)?;
        self.fire(ModelEvent::ObjectUpdated { id, kind });
        Ok(())
    }

    fn fire(&mut self, event: ModelEvent) {
        // Receivers that went away are dropped on the next publish
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
