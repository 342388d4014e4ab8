// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Context handed to DDL generation hooks

use crate::command::{CommandId, StructuralCommand};
use crate::error::{EditorError, EditorResult};
use crate::model::{ObjectGraph, ObjectId};
use std::collections::HashMap;

/// Read-only view of the model plus the pending child commands that a create
/// statement may inline.
///
/// A parent editor asks for [`nested_declarations`](Self::nested_declarations)
/// while rendering its create statement. Every child that returns a fragment
/// is recorded as absorbed and emits no statement of its own; children that
/// return nothing are emitted standalone later in the plan.
///
/// Statements run in registration order, so hooks read object names through
/// [`object_name`](Self::object_name): an object renamed by a later command
/// still carries its earlier name here.
pub struct PersistContext<'a> {
    model: &'a ObjectGraph,
    nested: Vec<&'a StructuralCommand>,
    absorbed: Vec<CommandId>,
    names: HashMap<ObjectId, &'a str>,
}

impl<'a> PersistContext<'a> {
    pub fn new(model: &'a ObjectGraph, nested: Vec<&'a StructuralCommand>) -> Self {
        Self {
            model,
            nested,
            absorbed: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Names objects had before the renames registered after this command
    pub(crate) fn with_names(mut self, names: HashMap<ObjectId, &'a str>) -> Self {
        self.names = names;
        self
    }

    /// Context without nested children
    pub fn standalone(model: &'a ObjectGraph) -> Self {
        Self::new(model, Vec::new())
    }

    pub fn model(&self) -> &'a ObjectGraph {
        self.model
    }

    /// Name of `object` at this point of the plan
    pub fn object_name(&self, object: ObjectId) -> EditorResult<&'a str> {
        match self.names.get(&object) {
            Some(name) => Ok(*name),
            None => Ok(self.model.get(object)?.name()),
        }
    }

    /// Name of the container of `object` at this point of the plan
    pub fn container_name(&self, object: ObjectId) -> EditorResult<&'a str> {
        let container = self.model.get(object)?.container().ok_or_else(|| {
            EditorError::InvalidOperation(format!("object {} has no container", object))
        })?;
        self.object_name(container)
    }

    /// Pending child commands of the object being created, in registration order
    pub fn nested_commands(&self) -> &[&'a StructuralCommand] {
        &self.nested
    }

    /// Inline fragments of the pending children of `owner`
    pub fn nested_declarations(&mut self, owner: ObjectId) -> Vec<String> {
        let mut declarations = Vec::new();
        for command in &self.nested {
            if self.absorbed.contains(&command.id()) {
                continue;
            }
            if let Some(declaration) = command.nested_declaration(self.model, owner) {
                declarations.push(declaration);
                self.absorbed.push(command.id());
            }
        }
        declarations
    }

    /// Child commands whose declarations were inlined so far
    pub fn absorbed(&self) -> &[CommandId] {
        &self.absorbed
    }

    /// Nested child commands absorbed so far, in registration order
    pub fn absorbed_commands(&self) -> Vec<&'a StructuralCommand> {
        self.nested
            .iter()
            .copied()
            .filter(|c| self.absorbed.contains(&c.id()))
            .collect()
    }

    pub(crate) fn into_absorbed(self) -> Vec<CommandId> {
        self.absorbed
    }
}
