// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Schema editor

use super::naming::{comment_action, quote_identifier, text_value};
use super::{allocate_object, container_cache, DESCRIPTION_PROPERTY};
use crate::command::{
    CommandContext, CommandKind, PersistAction, ProgressMonitor, StructuralCommand,
};
use crate::config::EditorConfig;
use crate::editor::{ObjectEditor, PersistContext};
use crate::error::{EditorError, EditorResult};
use crate::model::{CacheRef, Database, Handle, ObjectGraph, Schema, NAME_PROPERTY};
use serde_json::Value;

/// Role owning the schema
pub const OWNER_PROPERTY: &str = "owner";

const SCHEMAS_CACHE: &str = "schemas";
const DEFAULT_NAME: &str = "new_schema";

#[derive(Debug, Clone, Default)]
pub struct SchemaEditor {
    config: EditorConfig,
}

impl SchemaEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn schema_name(&self, cx: &PersistContext<'_>, command: &StructuralCommand) -> EditorResult<String> {
        Ok(quote_identifier(cx.object_name(command.target())?, &self.config))
    }
}

impl ObjectEditor for SchemaEditor {
    type Object = Schema;
    type Container = Database;

    fn name(&self) -> &'static str {
        "SchemaEditor"
    }

    fn objects_cache(&self, model: &ObjectGraph, object: Handle<Schema>) -> Option<CacheRef> {
        container_cache(model, object.id(), SCHEMAS_CACHE)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        _context: &CommandContext,
        parent: Handle<Database>,
        copy_from: Option<Handle<Schema>>,
    ) -> EditorResult<Handle<Schema>> {
        allocate_object(model, parent.id(), SCHEMAS_CACHE, DEFAULT_NAME, copy_from)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let mut script = format!("CREATE SCHEMA {}", self.schema_name(cx, command)?);
        let owner = cx.model().property(command.target(), OWNER_PROPERTY)?;
        if let Some(owner) = text_value(&owner) {
            script.push_str(" AUTHORIZATION ");
            script.push_str(&quote_identifier(owner, &self.config));
        }
        actions.push(PersistAction::new("Create schema", script));
        Ok(())
    }

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let Some(owner) = command.changes().new_value(OWNER_PROPERTY).and_then(text_value) else {
            return Ok(());
        };
        actions.push(PersistAction::new(
            "Alter schema owner",
            format!(
                "ALTER SCHEMA {} OWNER TO {}",
                self.schema_name(cx, command)?,
                quote_identifier(owner, &self.config)
            ),
        ));
        Ok(())
    }

    fn add_object_extra_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let Some(description) = command.changes().new_value(DESCRIPTION_PROPERTY) else {
            return Ok(());
        };
        let target = format!("SCHEMA {}", self.schema_name(cx, command)?);
        actions.push(comment_action("Comment schema", &target, description));
        Ok(())
    }

    fn add_object_rename_actions(
        &self,
        _cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let CommandKind::Rename { old_name, new_name } = command.kind() else {
            return Ok(());
        };
        actions.push(PersistAction::new(
            "Rename schema",
            format!(
                "ALTER SCHEMA {} RENAME TO {}",
                quote_identifier(old_name, &self.config),
                quote_identifier(new_name, &self.config)
            ),
        ));
        Ok(())
    }

    fn add_object_delete_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        actions.push(PersistAction::new(
            "Drop schema",
            format!("DROP SCHEMA {}", self.schema_name(cx, command)?),
        ));
        Ok(())
    }

    fn validate_object_property(
        &self,
        _model: &ObjectGraph,
        _object: Handle<Schema>,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        if property == NAME_PROPERTY && text_value(value).is_none() {
            return Err(EditorError::Validation("Schema name cannot be empty".to_string()));
        }
        Ok(())
    }

    fn validate_object_properties(
        &self,
        model: &ObjectGraph,
        command: &StructuralCommand,
        _progress: &ProgressMonitor,
    ) -> EditorResult<()> {
        if model.get(command.target())?.name().trim().is_empty() {
            return Err(EditorError::Validation("Schema name cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TypedEditor;

    #[test]
    fn test_create_schema_with_owner() {
        let mut model = ObjectGraph::new("postgres");
        let root = model.root();
        let editor = TypedEditor::new(SchemaEditor::default());
        let mut context = CommandContext::new();

        let schema = editor
            .create_new_object(&mut model, &mut context, root, None)
            .unwrap();
        editor
            .set_property(&mut model, &mut context, schema, NAME_PROPERTY, Value::from("sales"))
            .unwrap();
        editor
            .set_property(&mut model, &mut context, schema, OWNER_PROPERTY, Value::from("reporting"))
            .unwrap();

        let plan = context.prepare_commit(&model, &ProgressMonitor::new()).unwrap();
        let scripts: Vec<&str> = plan.actions().map(|a| a.script()).collect();
        assert_eq!(scripts, vec!["CREATE SCHEMA sales AUTHORIZATION reporting"]);
        assert_eq!(model.resolve_path(&["sales"]), Some(schema.id()));
    }
}
