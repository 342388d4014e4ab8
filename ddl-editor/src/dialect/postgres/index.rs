// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Index editor
//!
//! Indexes cannot be altered in place; a change of columns or uniqueness
//! drops and re-creates the index.

use super::naming::{quote_identifier, text_value};
use super::{allocate_object, container_cache};
use crate::command::{
    CommandContext, CommandKind, PersistAction, ProgressMonitor, StructuralCommand,
};
use crate::config::EditorConfig;
use crate::editor::{ObjectEditor, PersistContext};
use crate::error::{EditorError, EditorResult};
use crate::model::{
    CacheRef, DatabaseObject, Handle, Index, ObjectGraph, ObjectId, Table, NAME_PROPERTY,
};
use serde_json::Value;

/// Array of column names
pub const COLUMNS_PROPERTY: &str = "columns";
pub const UNIQUE_PROPERTY: &str = "unique";

const INDEXES_CACHE: &str = "indexes";
const COLUMNS_CACHE: &str = "columns";

#[derive(Debug, Clone, Default)]
pub struct IndexEditor {
    config: EditorConfig,
}

impl IndexEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn column_names(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .map(|columns| columns.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn create_action(&self, cx: &PersistContext<'_>, index: &DatabaseObject) -> EditorResult<PersistAction> {
        let table = cx.container_name(index.id())?;
        let columns = Self::column_names(&index.property(COLUMNS_PROPERTY))
            .into_iter()
            .map(|c| quote_identifier(c, &self.config))
            .collect::<Vec<_>>()
            .join(", ");
        let unique = if index.property(UNIQUE_PROPERTY).as_bool().unwrap_or(false) {
            "UNIQUE "
        } else {
            ""
        };
        Ok(PersistAction::new(
            "Create index",
            format!(
                "CREATE {}INDEX {} ON {} ({})",
                unique,
                quote_identifier(cx.object_name(index.id())?, &self.config),
                quote_identifier(table, &self.config),
                columns
            ),
        ))
    }

    fn drop_action(&self, cx: &PersistContext<'_>, index: ObjectId) -> EditorResult<PersistAction> {
        Ok(PersistAction::new(
            "Drop index",
            format!("DROP INDEX {}", quote_identifier(cx.object_name(index)?, &self.config)),
        ))
    }
}

impl ObjectEditor for IndexEditor {
    type Object = Index;
    type Container = Table;

    fn name(&self) -> &'static str {
        "IndexEditor"
    }

    fn objects_cache(&self, model: &ObjectGraph, object: Handle<Index>) -> Option<CacheRef> {
        container_cache(model, object.id(), INDEXES_CACHE)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        _context: &CommandContext,
        parent: Handle<Table>,
        copy_from: Option<Handle<Index>>,
    ) -> EditorResult<Handle<Index>> {
        let default_name = format!("{}_idx", model.get(parent.id())?.name());
        allocate_object(model, parent.id(), INDEXES_CACHE, &default_name, copy_from)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let index = cx.model().get(command.target())?;
        actions.push(self.create_action(cx, index)?);
        Ok(())
    }

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let rebuild = command
            .changes()
            .iter()
            .any(|(property, change)| {
                (property == COLUMNS_PROPERTY || property == UNIQUE_PROPERTY) && !change.is_noop()
            });
        if !rebuild {
            return Ok(());
        }
        let index = cx.model().get(command.target())?;
        actions.push(self.drop_action(cx, index.id())?);
        actions.push(self.create_action(cx, index)?);
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
            "Rename index",
            format!(
                "ALTER INDEX {} RENAME TO {}",
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
        actions.push(self.drop_action(cx, command.target())?);
        Ok(())
    }

    fn validate_object_property(
        &self,
        model: &ObjectGraph,
        object: Handle<Index>,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        match property {
            NAME_PROPERTY if text_value(value).is_none() => Err(EditorError::Validation(
                "Index name cannot be empty".to_string(),
            )),
            COLUMNS_PROPERTY => {
                let Some(entries) = value.as_array() else {
                    return Err(EditorError::Validation(
                        "Index columns must be a list of column names".to_string(),
                    ));
                };
                let table = model.get(object.id())?.container().ok_or_else(|| {
                    EditorError::InvalidOperation(format!("index {} has no table", object.id()))
                })?;
                let cache = model.cache(&CacheRef::new(table, COLUMNS_CACHE));
                for entry in entries {
                    let Some(column) = entry.as_str() else {
                        return Err(EditorError::Validation(format!(
                            "Index column must be a name, got {}",
                            entry
                        )));
                    };
                    if cache.and_then(|c| c.get(column)).is_none() {
                        return Err(EditorError::Validation(format!(
                            "Column '{}' does not exist in table '{}'",
                            column,
                            model.get(table)?.name()
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn validate_object_properties(
        &self,
        model: &ObjectGraph,
        command: &StructuralCommand,
        _progress: &ProgressMonitor,
    ) -> EditorResult<()> {
        let index = model.get(command.target())?;
        if Self::column_names(&index.property(COLUMNS_PROPERTY)).is_empty() {
            return Err(EditorError::Validation(format!(
                "Index '{}' must reference at least one column",
                index.name()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TypedEditor;
    use crate::model::{Column, Schema};

    fn fixture() -> (ObjectGraph, Handle<Table>) {
        let mut model = ObjectGraph::new("postgres");
        let root = model.root().id();
        let schema = model.load_object::<Schema>(root, "schemas", "public").unwrap();
        let table = model
            .load_object::<Table>(schema.id(), "tables", "orders")
            .unwrap();
        for column in ["id", "placed_at"] {
            model
                .load_object::<Column>(table.id(), COLUMNS_CACHE, column)
                .unwrap();
        }
        (model, table)
    }

    #[test]
    fn test_create_unique_index() {
        let (mut model, table) = fixture();
        let editor = TypedEditor::new(IndexEditor::default());
        let mut context = CommandContext::new();

        let index = editor
            .create_new_object(&mut model, &mut context, table, None)
            .unwrap();
        editor
            .set_property(
                &mut model,
                &mut context,
                index,
                COLUMNS_PROPERTY,
                serde_json::json!(["id", "placed_at"]),
            )
            .unwrap();
        editor
            .set_property(&mut model, &mut context, index, UNIQUE_PROPERTY, Value::from(true))
            .unwrap();

        let plan = context.prepare_commit(&model, &ProgressMonitor::new()).unwrap();
        let scripts: Vec<&str> = plan.actions().map(|a| a.script()).collect();
        assert_eq!(
            scripts,
            vec!["CREATE UNIQUE INDEX orders_idx ON orders (id, placed_at)"]
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let (mut model, table) = fixture();
        let editor = TypedEditor::new(IndexEditor::default());
        let mut context = CommandContext::new();

        let index = editor
            .create_new_object(&mut model, &mut context, table, None)
            .unwrap();
        let err = editor
            .set_property(
                &mut model,
                &mut context,
                index,
                COLUMNS_PROPERTY,
                serde_json::json!(["customer"]),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'customer' does not exist in table 'orders'"
        );
    }

    #[test]
    fn test_change_rebuilds_index() {
        let (mut model, table) = fixture();
        let index = model
            .load_object::<Index>(table.id(), INDEXES_CACHE, "orders_id_idx")
            .unwrap();
        model
            .set_property(index.id(), COLUMNS_PROPERTY, serde_json::json!(["id"]))
            .unwrap();

        let editor = TypedEditor::new(IndexEditor::default());
        let mut context = CommandContext::new();
        editor
            .set_property(&mut model, &mut context, index, UNIQUE_PROPERTY, Value::from(true))
            .unwrap();

        let plan = context.prepare_commit(&model, &ProgressMonitor::new()).unwrap();
        let titles: Vec<&str> = plan.actions().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["Drop index", "Create index"]);
        assert_eq!(
            plan.actions().last().unwrap().script(),
            "CREATE UNIQUE INDEX orders_id_idx ON orders (id)"
        );
    }
}
