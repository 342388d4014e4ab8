// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Object editor trait definition
//!
//! This module defines the hook trait every database object kind implements to
//! take part in structural editing. The trait binds one object type and one
//! container type, and supplies the dialect-specific pieces: the factory for
//! new objects, the DDL for each command kind, validation, and nested
//! declarations.

use super::persist::PersistContext;
use crate::command::{CommandContext, CommandId, PersistAction, ProgressMonitor, StructuralCommand};
use crate::error::{EditorError, EditorResult};
use crate::model::{CacheRef, Handle, ObjectGraph, ObjectType};
use serde_json::Value;

/// Per-object-kind editing policy
///
/// Implementations are stateless (or configuration-only) and shared by every
/// object of their kind. Register them in an
/// [`EditorRegistry`](super::registry::EditorRegistry) to have them picked up
/// by object kind at edit time.
pub trait ObjectEditor: Send + Sync + 'static {
    /// Kind of object this editor edits
    type Object: ObjectType;
    /// Kind of object that contains `Object`
    type Container: ObjectType;

    /// Editor name used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether new objects may be created inside `parent`
    fn can_create_object(&self, _model: &ObjectGraph, _parent: Handle<Self::Container>) -> bool {
        true
    }

    /// Whether `object` may be edited (property changes, rename)
    fn can_edit_object(&self, _model: &ObjectGraph, _object: Handle<Self::Object>) -> bool {
        true
    }

    /// Whether `object` may be deleted
    fn can_delete_object(&self, _model: &ObjectGraph, _object: Handle<Self::Object>) -> bool {
        true
    }

    /// Cache of the container that holds `object`
    ///
    /// # Returns
    /// * `Some(CacheRef)` naming the cache to insert into / remove from
    /// * `None` if objects of this kind are not cached
    fn objects_cache(&self, model: &ObjectGraph, object: Handle<Self::Object>) -> Option<CacheRef>;

    /// Factory hook: allocate a new object inside `parent`
    ///
    /// The object must not be placed in a cache; the create reflector does
    /// that once the create command is registered.
    ///
    /// # Arguments
    /// * `model` - Object graph to allocate the object in
    /// * `context` - Command context of the current session
    /// * `parent` - Container of the new object
    /// * `copy_from` - Existing object to copy properties from
    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        context: &CommandContext,
        parent: Handle<Self::Container>,
        copy_from: Option<Handle<Self::Object>>,
    ) -> EditorResult<Handle<Self::Object>>;

    /// Register commands for objects that a new object depends on or that
    /// depend on it. Called right after the create command is registered.
    fn create_object_references(
        &self,
        _model: &mut ObjectGraph,
        _context: &mut CommandContext,
        _create_command: CommandId,
    ) -> EditorResult<()> {
        Ok(())
    }

    /// DDL for a create command
    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    /// DDL for a composite property change
    fn add_object_modify_actions(
        &self,
        _cx: &mut PersistContext<'_>,
        _actions: &mut Vec<PersistAction>,
        _command: &StructuralCommand,
    ) -> EditorResult<()> {
        Ok(())
    }

    /// Auxiliary statements (comments, grants) appended after create and
    /// modify actions
    fn add_object_extra_actions(
        &self,
        _cx: &mut PersistContext<'_>,
        _actions: &mut Vec<PersistAction>,
        _command: &StructuralCommand,
    ) -> EditorResult<()> {
        Ok(())
    }

    /// DDL for a rename command
    ///
    /// Renaming differs too much between dialects to have a generic form, so
    /// the default fails. Editors that support renaming must override this.
    fn add_object_rename_actions(
        &self,
        _cx: &mut PersistContext<'_>,
        _actions: &mut Vec<PersistAction>,
        _command: &StructuralCommand,
    ) -> EditorResult<()> {
        Err(EditorError::UnsupportedOperation(format!(
            "Object rename is not supported in {}",
            self.name()
        )))
    }

    /// DDL for a delete command
    fn add_object_delete_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    /// Inline declaration of the command's object for embedding in the
    /// statement of `owner`, e.g. a column clause inside `CREATE TABLE`.
    ///
    /// # Returns
    /// * `None` when this editor contributes no inline fragment; the caller
    ///   then emits the command as a standalone statement
    fn nested_declaration(
        &self,
        _model: &ObjectGraph,
        _owner: Handle<Self::Container>,
        _command: &StructuralCommand,
    ) -> Option<String> {
        None
    }

    /// Check one property value before it is recorded
    fn validate_object_property(
        &self,
        _model: &ObjectGraph,
        _object: Handle<Self::Object>,
        _property: &str,
        _value: &Value,
    ) -> EditorResult<()> {
        Ok(())
    }

    /// Check the object against the full pending change set of a composite
    /// command. Runs before any DDL is generated.
    fn validate_object_properties(
        &self,
        _model: &ObjectGraph,
        _command: &StructuralCommand,
        _progress: &ProgressMonitor,
    ) -> EditorResult<()> {
        Ok(())
    }

    /// Per-property reflection hook, called after a property value has been
    /// written to the model (on edit, undo and redo)
    fn reflect_value_change(
        &self,
        _model: &mut ObjectGraph,
        _object: Handle<Self::Object>,
        _property: &str,
        _old_value: &Value,
        _new_value: &Value,
    ) -> EditorResult<()> {
        Ok(())
    }
}
