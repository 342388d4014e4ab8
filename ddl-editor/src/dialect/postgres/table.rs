// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table editor
//!
//! `CREATE TABLE` inlines the declarations of columns created in the same
//! session. Comments of those columns follow the table statement.

use super::naming::{comment_action, quote_identifier, text_value};
use super::{allocate_object, container_cache, DESCRIPTION_PROPERTY};
use crate::command::{
    CommandContext, CommandKind, PersistAction, ProgressMonitor, StructuralCommand,
};
use crate::config::EditorConfig;
use crate::editor::{ObjectEditor, PersistContext};
use crate::error::{EditorError, EditorResult};
use crate::model::{CacheRef, Handle, ObjectGraph, Schema, Table, NAME_PROPERTY};
use serde_json::Value;

const TABLES_CACHE: &str = "tables";
const DEFAULT_NAME: &str = "NewTable";

#[derive(Debug, Clone, Default)]
pub struct TableEditor {
    config: EditorConfig,
}

impl TableEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn table_name(&self, cx: &PersistContext<'_>, command: &StructuralCommand) -> EditorResult<String> {
        Ok(quote_identifier(cx.object_name(command.target())?, &self.config))
    }
}

impl ObjectEditor for TableEditor {
    type Object = Table;
    type Container = Schema;

    fn name(&self) -> &'static str {
        "TableEditor"
    }

    fn objects_cache(&self, model: &ObjectGraph, object: Handle<Table>) -> Option<CacheRef> {
        container_cache(model, object.id(), TABLES_CACHE)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        _context: &CommandContext,
        parent: Handle<Schema>,
        copy_from: Option<Handle<Table>>,
    ) -> EditorResult<Handle<Table>> {
        allocate_object(model, parent.id(), TABLES_CACHE, DEFAULT_NAME, copy_from)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let name = self.table_name(cx, command)?;
        let separator = &self.config.line_separator;
        let indent = self.config.indentation();

        let columns = cx.nested_declarations(command.target());
        let script = if columns.is_empty() {
            format!("CREATE TABLE {} ()", name)
        } else {
            let body = columns
                .iter()
                .map(|column| format!("{}{}", indent, column))
                .collect::<Vec<_>>()
                .join(&format!(",{}", separator));
            format!("CREATE TABLE {} ({}{}{})", name, separator, body, separator)
        };
        actions.push(PersistAction::new("Create table", script));

        // Absorbed columns emit no statements of their own, so their
        // comments are added here
        for column in cx.absorbed_commands() {
            column
                .editor()
                .add_object_extra_actions(cx, actions, column)?;
        }
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
        let target = format!("TABLE {}", self.table_name(cx, command)?);
        actions.push(comment_action("Comment table", &target, description));
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
            "Rename table",
            format!(
                "ALTER TABLE {} RENAME TO {}",
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
        let name = self.table_name(cx, command)?;
        actions.push(PersistAction::new("Drop table", format!("DROP TABLE {}", name)));
        Ok(())
    }

    fn validate_object_property(
        &self,
        _model: &ObjectGraph,
        _object: Handle<Table>,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        if property == NAME_PROPERTY && text_value(value).is_none() {
            return Err(EditorError::Validation("Table name cannot be empty".to_string()));
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
            return Err(EditorError::Validation("Table name cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ScriptCollector;
    use crate::editor::TypedEditor;

    #[test]
    fn test_rename_persisted_table() {
        let mut model = ObjectGraph::new("postgres");
        let root = model.root().id();
        let schema = model.load_object::<Schema>(root, "schemas", "public").unwrap();
        let table = model
            .load_object::<Table>(schema.id(), TABLES_CACHE, "orders")
            .unwrap();

        let editor = TypedEditor::new(TableEditor::default());
        let mut context = CommandContext::new();
        editor
            .rename_object(&mut model, &mut context, table, "order_archive")
            .unwrap();
        assert_eq!(model.find_child(schema.id(), "order_archive"), Some(table.id()));

        let mut collector = ScriptCollector::new();
        context
            .commit(&mut model, &mut collector, &ProgressMonitor::new())
            .unwrap();
        assert_eq!(collector.actions().len(), 1);
        assert_eq!(
            collector.actions()[0].script(),
            "ALTER TABLE orders RENAME TO order_archive"
        );
        assert!(context.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let mut model = ObjectGraph::new("postgres");
        let root = model.root().id();
        let schema = model.load_object::<Schema>(root, "schemas", "public").unwrap();

        let editor = TypedEditor::new(TableEditor::new(EditorConfig::strict_quoting()));
        let mut context = CommandContext::new();
        let table = editor
            .create_new_object(&mut model, &mut context, schema, None)
            .unwrap();

        let plan = context.prepare_commit(&model, &ProgressMonitor::new()).unwrap();
        let scripts: Vec<&str> = plan.actions().map(|a| a.script()).collect();
        assert_eq!(scripts, vec!["CREATE TABLE \"NewTable\" ()"]);
        assert_eq!(model.get(table.id()).unwrap().name(), "NewTable");
    }
}
