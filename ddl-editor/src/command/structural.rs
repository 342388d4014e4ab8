// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Structural commands
//!
//! A structural command is one pending change to one target object: create,
//! delete, rename, or a composite property change. Commands carry the editor
//! of their object kind and delegate DDL generation and validation to it.

use super::action::PersistAction;
use super::progress::ProgressMonitor;
use super::tracker::PropertyChanges;
use crate::editor::dynamic::DynObjectEditor;
use crate::editor::persist::PersistContext;
use crate::error::{EditorError, EditorResult};
use crate::model::{Handle, ObjectGraph, ObjectId, ObjectKind, ObjectType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const CREATE_TITLE: &str = "Create new object";
pub const DELETE_TITLE: &str = "Delete object";
pub const RENAME_TITLE: &str = "Rename object";
pub const CHANGE_TITLE: &str = "Change object properties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Delete,
    Rename { old_name: String, new_name: String },
    Change,
}

impl CommandKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Create => "create",
            CommandKind::Delete => "delete",
            CommandKind::Rename { .. } => "rename",
            CommandKind::Change => "change",
        }
    }
}

/// One unit of pending change to one object
#[derive(Clone)]
pub struct StructuralCommand {
    id: CommandId,
    target: ObjectId,
    target_kind: ObjectKind,
    title: String,
    kind: CommandKind,
    changes: PropertyChanges,
    editor: Arc<dyn DynObjectEditor>,
}

impl StructuralCommand {
    fn new(
        editor: Arc<dyn DynObjectEditor>,
        target: ObjectId,
        title: &str,
        kind: CommandKind,
    ) -> Self {
        Self {
            id: CommandId::new(),
            target,
            target_kind: editor.object_kind(),
            title: title.to_string(),
            kind,
            changes: PropertyChanges::new(),
            editor,
        }
    }

    pub fn create(editor: Arc<dyn DynObjectEditor>, target: ObjectId, title: &str) -> Self {
        Self::new(editor, target, title, CommandKind::Create)
    }

    pub fn delete(editor: Arc<dyn DynObjectEditor>, target: ObjectId, title: &str) -> Self {
        Self::new(editor, target, title, CommandKind::Delete)
    }

    pub fn change(editor: Arc<dyn DynObjectEditor>, target: ObjectId, title: &str) -> Self {
        Self::new(editor, target, title, CommandKind::Change)
    }

    /// Captures the object's current name as the old name
    pub fn rename(
        editor: Arc<dyn DynObjectEditor>,
        model: &ObjectGraph,
        target: ObjectId,
        title: &str,
        new_name: &str,
    ) -> EditorResult<Self> {
        let old_name = model.get(target)?.name().to_string();
        Ok(Self::new(
            editor,
            target,
            title,
            CommandKind::Rename {
                old_name,
                new_name: new_name.to_string(),
            },
        ))
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn target(&self) -> ObjectId {
        self.target
    }

    pub fn target_kind(&self) -> ObjectKind {
        self.target_kind
    }

    /// Typed handle to the target, failing if the target is not a `T`
    pub fn target_as<T: ObjectType>(&self) -> EditorResult<Handle<T>> {
        if self.target_kind != T::KIND {
            return Err(EditorError::InvalidOperation(format!(
                "command {} targets a {}, not a {}",
                self.id,
                self.target_kind,
                T::KIND
            )));
        }
        Ok(Handle::new_unchecked(self.target))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn changes(&self) -> &PropertyChanges {
        &self.changes
    }

    pub(crate) fn changes_mut(&mut self) -> &mut PropertyChanges {
        &mut self.changes
    }

    pub fn editor(&self) -> &Arc<dyn DynObjectEditor> {
        &self.editor
    }

    /// Create and change commands accumulate property edits
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, CommandKind::Create | CommandKind::Change)
    }

    /// Generate this command's DDL. Does not touch the model.
    pub fn persist_actions(&self, cx: &mut PersistContext<'_>) -> EditorResult<Vec<PersistAction>> {
        let mut actions = Vec::new();
        match &self.kind {
            CommandKind::Create => {
                self.editor.add_object_create_actions(cx, &mut actions, self)?;
                self.editor.add_object_extra_actions(cx, &mut actions, self)?;
            }
            CommandKind::Change => {
                self.editor.add_object_modify_actions(cx, &mut actions, self)?;
                self.editor.add_object_extra_actions(cx, &mut actions, self)?;
            }
            CommandKind::Delete => {
                self.editor.add_object_delete_actions(cx, &mut actions, self)?;
            }
            CommandKind::Rename { .. } => {
                self.editor.add_object_rename_actions(cx, &mut actions, self)?;
            }
        }
        Ok(actions)
    }

    /// DDL for this command alone, without nested child commands
    pub fn standalone_persist_actions(&self, model: &ObjectGraph) -> EditorResult<Vec<PersistAction>> {
        self.persist_actions(&mut PersistContext::standalone(model))
    }

    pub fn validate(&self, model: &ObjectGraph, progress: &ProgressMonitor) -> EditorResult<()> {
        progress.check()?;
        if self.is_composite() {
            self.editor.validate_object_properties(model, self, progress)?;
        }
        Ok(())
    }

    /// Apply the committed effect of this command to the model.
    ///
    /// Change commands are reflected property by property through their
    /// reflector, so there is nothing left to do for them here.
    pub fn update_model(&self, model: &mut ObjectGraph) -> EditorResult<()> {
        match &self.kind {
            CommandKind::Create => {
                model.set_persisted(self.target, true)?;
                model.fire_object_update(self.target)?;
            }
            CommandKind::Delete => {
                if self.editor.objects_cache(model, self.target).is_some() {
                    model.remove_from_cache(self.target)?;
                }
            }
            CommandKind::Rename { new_name, .. } => {
                model.set_name(self.target, new_name)?;
                model.fire_object_update(self.target)?;
            }
            CommandKind::Change => {}
        }
        Ok(())
    }

    /// Inline fragment for embedding in the statement of `owner`.
    ///
    /// `None` means the caller must fall back to a standalone statement.
    pub fn nested_declaration(&self, model: &ObjectGraph, owner: ObjectId) -> Option<String> {
        if !self.is_composite() {
            return None;
        }
        self.editor
            .nested_declaration(model, owner, self)
            .filter(|decl| !decl.trim().is_empty())
    }
}

impl fmt::Debug for StructuralCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralCommand")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("target_kind", &self.target_kind)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("changes", &self.changes)
            .field("editor", &self.editor.name())
            .finish()
    }
}
