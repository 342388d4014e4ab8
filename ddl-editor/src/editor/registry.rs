// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Editor registry implementation
//!
//! This module provides the EditorRegistry that maps object kinds to the
//! editors responsible for them. Front ends look editors up here instead of
//! holding on to concrete editor types.

use super::dynamic::EditorHandle;
use super::traits::ObjectEditor;
use crate::error::{EditorError, EditorResult};
use crate::model::{ObjectGraph, ObjectId, ObjectKind};
use std::collections::HashMap;

/// Central registry of object editors, one per object kind
#[derive(Debug, Default, Clone)]
pub struct EditorRegistry {
    /// Map of object kind to its editor
    editors: HashMap<ObjectKind, EditorHandle>,
}

impl EditorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an editor for the kind of object it edits
    ///
    /// A previously registered editor for the same kind is replaced.
    ///
    /// # Arguments
    /// * `editor` - Editor implementation
    pub fn register<E: ObjectEditor>(&mut self, editor: E) {
        self.register_handle(EditorHandle::new(editor));
    }

    /// Register an already type-erased editor
    pub fn register_handle(&mut self, editor: EditorHandle) {
        let kind = editor.object_kind();
        if let Some(previous) = self.editors.insert(kind, editor) {
            log::warn!(
                "Editor '{}' for {} replaced by '{}'",
                previous.name(),
                kind,
                self.editors[&kind].name()
            );
        }
        log::info!("Registered object editor: {} ({})", self.editors[&kind].name(), kind);
    }

    /// Get the editor for an object kind
    ///
    /// # Returns
    /// * `Some(&EditorHandle)` if an editor is registered
    /// * `None` if no editor handles this kind
    pub fn get(&self, kind: ObjectKind) -> Option<&EditorHandle> {
        self.editors.get(&kind)
    }

    /// Get the editor for an object kind, failing when none is registered
    ///
    /// # Returns
    /// * `Ok(&EditorHandle)` if an editor is registered
    /// * `Err(EditorError::EditorNotFound)` otherwise
    pub fn editor_for(&self, kind: ObjectKind) -> EditorResult<&EditorHandle> {
        self.get(kind).ok_or(EditorError::EditorNotFound(kind))
    }

    /// Get the editor responsible for an existing object
    pub fn editor_for_object(
        &self,
        model: &ObjectGraph,
        object: ObjectId,
    ) -> EditorResult<&EditorHandle> {
        self.editor_for(model.kind_of(object)?)
    }

    /// Registered object kinds, in declaration order
    pub fn kinds(&self) -> Vec<ObjectKind> {
        let mut kinds: Vec<ObjectKind> = self.editors.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn has_editor(&self, kind: ObjectKind) -> bool {
        self.editors.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
