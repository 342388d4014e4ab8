// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command reflectors
//!
//! A reflector applies a command's effect to the in-memory model (`redo`) and
//! reverts it (`undo`), independently of whether the DDL ever ran.

use super::structural::{CommandKind, StructuralCommand};
use crate::error::{EditorError, EditorResult};
use crate::model::ObjectGraph;
use serde_json::Value;

pub trait CommandReflector: Send + Sync {
    fn redo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()>;

    fn undo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()>;
}

/// Inserts a new object into its cache and marks it persisted
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateObjectReflector;

impl CommandReflector for CreateObjectReflector {
    fn redo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        let target = command.target();
        let cache = command
            .editor()
            .objects_cache(model, target)
            .ok_or_else(|| {
                EditorError::InvalidOperation(format!(
                    "{} has no object cache for {}",
                    command.editor().name(),
                    target
                ))
            })?;
        model.insert_into_cache(cache, target)?;
        model.set_persisted(target, true)
    }

    fn undo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        model.remove_from_cache(command.target())?;
        model.set_persisted(command.target(), false)
    }
}

/// Detaches an object from its cache; undo puts it back
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteObjectReflector;

impl CommandReflector for DeleteObjectReflector {
    fn redo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        model.remove_from_cache(command.target())?;
        Ok(())
    }

    fn undo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        let target = command.target();
        match command.editor().objects_cache(model, target) {
            Some(cache) => model.insert_into_cache(cache, target),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RenameObjectReflector;

impl CommandReflector for RenameObjectReflector {
    fn redo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        if let CommandKind::Rename { new_name, .. } = command.kind() {
            model.set_name(command.target(), new_name)?;
            model.fire_object_update(command.target())?;
        }
        Ok(())
    }

    fn undo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        if let CommandKind::Rename { old_name, .. } = command.kind() {
            model.set_name(command.target(), old_name)?;
            model.fire_object_update(command.target())?;
        }
        Ok(())
    }
}

/// Writes every tracked property of a composite command: new values on redo,
/// the values captured before the first edit on undo.
///
/// Each write also goes through the editor's per-property reflection hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyChangeReflector;

impl CommandReflector for PropertyChangeReflector {
    fn redo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        for (property, change) in command.changes().iter() {
            reflect_property(model, command, property, &change.old_value, &change.new_value)?;
        }
        Ok(())
    }

    fn undo(&self, model: &mut ObjectGraph, command: &StructuralCommand) -> EditorResult<()> {
        for (property, change) in command.changes().iter() {
            reflect_property(model, command, property, &change.new_value, &change.old_value)?;
        }
        Ok(())
    }
}

pub(crate) fn reflect_property(
    model: &mut ObjectGraph,
    command: &StructuralCommand,
    property: &str,
    old_value: &Value,
    new_value: &Value,
) -> EditorResult<()> {
    let target = command.target();
    model.set_property(target, property, new_value.clone())?;
    command
        .editor()
        .reflect_value_change(model, target, property, old_value, new_value)?;
    model.fire_object_update(target)
}
