// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Type-erased editors and edit orchestration
//!
//! [`ObjectEditor`] is generic over its object and container types, which
//! keeps dialect code typed but cannot be stored behind one pointer type.
//! [`DynObjectEditor`] is the object-safe face of an editor: ids go in, kind
//! checks happen at the boundary, typed handles come out on the other side.
//!
//! [`EditorHandle`] drives the user-level edit operations (create, delete,
//! rename, set property) through the command context. [`TypedEditor`] offers
//! the same operations with typed handles, so a table editor cannot be called
//! with a schema as its target.

use super::persist::PersistContext;
use super::traits::ObjectEditor;
use crate::command::structural::{CHANGE_TITLE, CREATE_TITLE, DELETE_TITLE, RENAME_TITLE};
use crate::command::{
    CommandContext, CommandId, CreateObjectReflector, DeleteObjectReflector, PersistAction,
    ProgressMonitor, PropertyChangeReflector, RenameObjectReflector, StructuralCommand,
};
use crate::error::{EditorError, EditorResult};
use crate::model::{
    CacheRef, Handle, ObjectGraph, ObjectId, ObjectKind, ObjectType, NAME_PROPERTY,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Object-safe editor interface working on untyped ids
pub trait DynObjectEditor: Send + Sync {
    fn name(&self) -> &'static str;
    fn object_kind(&self) -> ObjectKind;
    fn container_kind(&self) -> ObjectKind;

    fn can_create_object(&self, model: &ObjectGraph, parent: ObjectId) -> EditorResult<bool>;
    fn can_edit_object(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<bool>;
    fn can_delete_object(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<bool>;

    fn objects_cache(&self, model: &ObjectGraph, object: ObjectId) -> Option<CacheRef>;

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        context: &CommandContext,
        parent: ObjectId,
        copy_from: Option<ObjectId>,
    ) -> EditorResult<ObjectId>;

    fn create_object_references(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        create_command: CommandId,
    ) -> EditorResult<()>;

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    fn add_object_extra_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    fn add_object_rename_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    fn add_object_delete_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()>;

    /// `None` as well when `owner` is not of this editor's container kind
    fn nested_declaration(
        &self,
        model: &ObjectGraph,
        owner: ObjectId,
        command: &StructuralCommand,
    ) -> Option<String>;

    fn validate_object_property(
        &self,
        model: &ObjectGraph,
        object: ObjectId,
        property: &str,
        value: &Value,
    ) -> EditorResult<()>;

    fn validate_object_properties(
        &self,
        model: &ObjectGraph,
        command: &StructuralCommand,
        progress: &ProgressMonitor,
    ) -> EditorResult<()>;

    fn reflect_value_change(
        &self,
        model: &mut ObjectGraph,
        object: ObjectId,
        property: &str,
        old_value: &Value,
        new_value: &Value,
    ) -> EditorResult<()>;
}

/// Wraps a typed editor and performs the kind checks
struct EditorAdapter<E: ObjectEditor> {
    inner: E,
}

impl<E: ObjectEditor> EditorAdapter<E> {
    fn container(&self, model: &ObjectGraph, parent: ObjectId) -> EditorResult<Handle<E::Container>> {
        let actual = model.kind_of(parent)?;
        if actual != <E::Container as ObjectType>::KIND {
            return Err(EditorError::ContainerTypeMismatch {
                editor: self.inner.name(),
                expected: <E::Container as ObjectType>::KIND,
                actual,
            });
        }
        model.handle::<E::Container>(parent)
    }

    fn object(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<Handle<E::Object>> {
        model.handle::<E::Object>(object)
    }
}

impl<E: ObjectEditor> DynObjectEditor for EditorAdapter<E> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn object_kind(&self) -> ObjectKind {
        <E::Object as ObjectType>::KIND
    }

    fn container_kind(&self) -> ObjectKind {
        <E::Container as ObjectType>::KIND
    }

    fn can_create_object(&self, model: &ObjectGraph, parent: ObjectId) -> EditorResult<bool> {
        let parent = self.container(model, parent)?;
        Ok(self.inner.can_create_object(model, parent))
    }

    fn can_edit_object(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<bool> {
        let object = self.object(model, object)?;
        Ok(self.inner.can_edit_object(model, object))
    }

    fn can_delete_object(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<bool> {
        let object = self.object(model, object)?;
        Ok(self.inner.can_delete_object(model, object))
    }

    fn objects_cache(&self, model: &ObjectGraph, object: ObjectId) -> Option<CacheRef> {
        let object = self.object(model, object).ok()?;
        self.inner.objects_cache(model, object)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        context: &CommandContext,
        parent: ObjectId,
        copy_from: Option<ObjectId>,
    ) -> EditorResult<ObjectId> {
        let parent = self.container(model, parent)?;
        let copy_from = copy_from
            .map(|source| self.object(model, source))
            .transpose()?;
        let created = self
            .inner
            .create_database_object(model, context, parent, copy_from)?;
        Ok(created.id())
    }

    fn create_object_references(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        create_command: CommandId,
    ) -> EditorResult<()> {
        self.inner
            .create_object_references(model, context, create_command)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        self.inner.add_object_create_actions(cx, actions, command)
    }

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        self.inner.add_object_modify_actions(cx, actions, command)
    }

    fn add_object_extra_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        self.inner.add_object_extra_actions(cx, actions, command)
    }

    fn add_object_rename_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        self.inner.add_object_rename_actions(cx, actions, command)
    }

    fn add_object_delete_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        self.inner.add_object_delete_actions(cx, actions, command)
    }

    fn nested_declaration(
        &self,
        model: &ObjectGraph,
        owner: ObjectId,
        command: &StructuralCommand,
    ) -> Option<String> {
        let owner = model.handle::<E::Container>(owner).ok()?;
        self.inner.nested_declaration(model, owner, command)
    }

    fn validate_object_property(
        &self,
        model: &ObjectGraph,
        object: ObjectId,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        let object = self.object(model, object)?;
        self.inner
            .validate_object_property(model, object, property, value)
    }

    fn validate_object_properties(
        &self,
        model: &ObjectGraph,
        command: &StructuralCommand,
        progress: &ProgressMonitor,
    ) -> EditorResult<()> {
        self.inner
            .validate_object_properties(model, command, progress)
    }

    fn reflect_value_change(
        &self,
        model: &mut ObjectGraph,
        object: ObjectId,
        property: &str,
        old_value: &Value,
        new_value: &Value,
    ) -> EditorResult<()> {
        let object = self.object(model, object)?;
        self.inner
            .reflect_value_change(model, object, property, old_value, new_value)
    }
}

/// Shared, type-erased editor plus the edit operations built on it
#[derive(Clone)]
pub struct EditorHandle {
    editor: Arc<dyn DynObjectEditor>,
}

impl EditorHandle {
    pub fn new<E: ObjectEditor>(editor: E) -> Self {
        Self {
            editor: Arc::new(EditorAdapter { inner: editor }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.editor.name()
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.editor.object_kind()
    }

    pub fn container_kind(&self) -> ObjectKind {
        self.editor.container_kind()
    }

    pub fn as_dyn(&self) -> &Arc<dyn DynObjectEditor> {
        &self.editor
    }

    /// False as well when `parent` is of the wrong kind
    pub fn can_create_object(&self, model: &ObjectGraph, parent: ObjectId) -> bool {
        self.editor.can_create_object(model, parent).unwrap_or(false)
    }

    pub fn can_edit_object(&self, model: &ObjectGraph, object: ObjectId) -> bool {
        self.editor.can_edit_object(model, object).unwrap_or(false)
    }

    pub fn can_delete_object(&self, model: &ObjectGraph, object: ObjectId) -> bool {
        self.editor.can_delete_object(model, object).unwrap_or(false)
    }

    fn ensure_editable(&self, model: &ObjectGraph, object: ObjectId) -> EditorResult<()> {
        if !self.editor.can_edit_object(model, object)? {
            let name = model.get(object)?.name();
            return Err(EditorError::UnsupportedOperation(format!(
                "{} cannot edit {} '{}'",
                self.name(),
                self.object_kind(),
                name
            )));
        }
        Ok(())
    }

    /// Create a new object inside `parent` and register its create command.
    ///
    /// The create reflector runs immediately, so the object shows up in its
    /// container's cache right away. The command is recorded in the user
    /// params as the object's pending create, which later edits of the
    /// object extend.
    pub fn create_new_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        parent: ObjectId,
        copy_from: Option<ObjectId>,
    ) -> EditorResult<ObjectId> {
        if context.is_committing() {
            return Err(EditorError::InvalidOperation(
                "commit in progress; the command context cannot be edited".to_string(),
            ));
        }
        if !self.editor.can_create_object(model, parent)? {
            return Err(EditorError::UnsupportedOperation(format!(
                "{} cannot create objects in {} '{}'",
                self.name(),
                self.container_kind(),
                model.get(parent)?.name()
            )));
        }

        let object = self
            .editor
            .create_database_object(model, context, parent, copy_from)?;

        let command = StructuralCommand::create(self.editor.clone(), object, CREATE_TITLE);
        let command_id =
            match context.add_command(model, command, Arc::new(CreateObjectReflector), true) {
                Ok(id) => id,
                Err(e) => {
                    Self::discard_new_object(model, object);
                    return Err(e);
                }
            };
        context
            .user_params_mut()
            .set_pending_create(object, command_id);

        if let Err(e) = self
            .editor
            .create_object_references(model, context, command_id)
        {
            if let Err(cleanup) = context.discard_since(model, command_id) {
                log::warn!("Could not withdraw create command {}: {}", command_id, cleanup);
                return Err(e);
            }
            Self::discard_new_object(model, object);
            return Err(e);
        }

        log::debug!(
            "Created new {} '{}' in {}",
            self.object_kind(),
            model.get(object)?.name(),
            parent
        );
        Ok(object)
    }

    fn discard_new_object(model: &mut ObjectGraph, object: ObjectId) {
        if let Err(e) = model.discard_object(object) {
            log::warn!("Could not discard new object {}: {}", object, e);
        }
    }

    pub fn delete_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: ObjectId,
    ) -> EditorResult<CommandId> {
        if !self.editor.can_delete_object(model, object)? {
            return Err(EditorError::UnsupportedOperation(format!(
                "{} cannot delete {} '{}'",
                self.name(),
                self.object_kind(),
                model.get(object)?.name()
            )));
        }

        let command = StructuralCommand::delete(self.editor.clone(), object, DELETE_TITLE);
        context.add_command(model, command, Arc::new(DeleteObjectReflector), true)
    }

    /// Rename an object.
    ///
    /// An object whose create command is still pending has nothing to rename
    /// in the database yet, so the new name is folded into the create command.
    pub fn rename_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: ObjectId,
        new_name: &str,
    ) -> EditorResult<CommandId> {
        self.ensure_editable(model, object)?;

        let value = Value::String(new_name.to_string());
        self.editor
            .validate_object_property(model, object, NAME_PROPERTY, &value)?;

        if let Some(create) = context.user_params().pending_create(object) {
            context.record_property_change(model, create, NAME_PROPERTY, value)?;
            return Ok(create);
        }

        if model.get(object)?.name() == new_name {
            return Err(EditorError::InvalidOperation(format!(
                "{} is already named '{}'",
                object, new_name
            )));
        }

        let command =
            StructuralCommand::rename(self.editor.clone(), model, object, RENAME_TITLE, new_name)?;
        context.add_command(model, command, Arc::new(RenameObjectReflector), true)
    }

    /// Record a property edit.
    ///
    /// The edit lands in the object's pending create command if there is one,
    /// otherwise in its pending change command, which is created on the first
    /// edit. The new value is reflected onto the model immediately.
    pub fn set_property(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: ObjectId,
        property: &str,
        value: Value,
    ) -> EditorResult<CommandId> {
        self.ensure_editable(model, object)?;

        let pending_create = context.user_params().pending_create(object);
        if property == NAME_PROPERTY && pending_create.is_none() {
            let Value::String(name) = &value else {
                return Err(EditorError::InvalidOperation(format!(
                    "object name must be a string, got {}",
                    value
                )));
            };
            return self.rename_object(model, context, object, name);
        }

        self.editor
            .validate_object_property(model, object, property, &value)?;

        if let Some(existing) = pending_create.or_else(|| context.user_params().pending_change(object)) {
            context.record_property_change(model, existing, property, value)?;
            return Ok(existing);
        }

        let current = model.property(object, property)?;
        let mut command = StructuralCommand::change(self.editor.clone(), object, CHANGE_TITLE);
        command.changes_mut().record(property, current, value);
        let command_id =
            context.add_command(model, command, Arc::new(PropertyChangeReflector), true)?;
        context
            .user_params_mut()
            .set_pending_change(object, command_id);
        Ok(command_id)
    }
}

impl fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorHandle")
            .field("name", &self.name())
            .field("object_kind", &self.object_kind())
            .field("container_kind", &self.container_kind())
            .finish()
    }
}

/// Editor with typed entry points
pub struct TypedEditor<E: ObjectEditor> {
    inner: Arc<EditorAdapter<E>>,
}

impl<E: ObjectEditor> TypedEditor<E> {
    pub fn new(editor: E) -> Self {
        Self {
            inner: Arc::new(EditorAdapter { inner: editor }),
        }
    }

    pub fn editor(&self) -> &E {
        &self.inner.inner
    }

    /// Type-erased handle sharing this editor
    pub fn handle(&self) -> EditorHandle {
        let editor: Arc<dyn DynObjectEditor> = self.inner.clone();
        EditorHandle { editor }
    }

    pub fn create_new_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        parent: Handle<E::Container>,
        copy_from: Option<Handle<E::Object>>,
    ) -> EditorResult<Handle<E::Object>> {
        let id = self.handle().create_new_object(
            model,
            context,
            parent.id(),
            copy_from.map(|h| h.id()),
        )?;
        Ok(Handle::new_unchecked(id))
    }

    pub fn delete_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: Handle<E::Object>,
    ) -> EditorResult<CommandId> {
        self.handle().delete_object(model, context, object.id())
    }

    pub fn rename_object(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: Handle<E::Object>,
        new_name: &str,
    ) -> EditorResult<CommandId> {
        self.handle()
            .rename_object(model, context, object.id(), new_name)
    }

    pub fn set_property(
        &self,
        model: &mut ObjectGraph,
        context: &mut CommandContext,
        object: Handle<E::Object>,
        property: &str,
        value: Value,
    ) -> EditorResult<CommandId> {
        self.handle()
            .set_property(model, context, object.id(), property, value)
    }
}

impl<E: ObjectEditor> Clone for TypedEditor<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
