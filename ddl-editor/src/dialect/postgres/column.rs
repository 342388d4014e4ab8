// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Column editor

use super::naming::{comment_action, quote_identifier, text_value};
use super::{allocate_object, container_cache, DESCRIPTION_PROPERTY};
use crate::command::{
    CommandContext, CommandKind, PersistAction, ProgressMonitor, StructuralCommand,
};
use crate::config::EditorConfig;
use crate::editor::{ObjectEditor, PersistContext};
use crate::error::{EditorError, EditorResult};
use crate::model::{CacheRef, Column, DatabaseObject, Handle, ObjectGraph, Table, NAME_PROPERTY};
use serde_json::Value;

pub const DATA_TYPE_PROPERTY: &str = "data_type";
/// Boolean; columns are nullable unless set to `false`
pub const NULLABLE_PROPERTY: &str = "nullable";
/// Default expression, emitted verbatim
pub const DEFAULT_VALUE_PROPERTY: &str = "default_value";

const COLUMNS_CACHE: &str = "columns";
const DEFAULT_NAME: &str = "new_column";

#[derive(Debug, Clone, Default)]
pub struct ColumnEditor {
    config: EditorConfig,
}

impl ColumnEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn is_nullable(column: &DatabaseObject) -> bool {
        column.property(NULLABLE_PROPERTY).as_bool().unwrap_or(true)
    }

    /// `name type [NOT NULL] [DEFAULT expr]`
    fn declaration(&self, name: &str, column: &DatabaseObject) -> String {
        let mut decl = format!(
            "{} {}",
            quote_identifier(name, &self.config),
            column.property_str(DATA_TYPE_PROPERTY).unwrap_or_default()
        );
        if !Self::is_nullable(column) {
            decl.push_str(" NOT NULL");
        }
        if let Some(default) = text_value(&column.property(DEFAULT_VALUE_PROPERTY)) {
            decl.push_str(" DEFAULT ");
            decl.push_str(default);
        }
        decl
    }

    fn alter_table(&self, cx: &PersistContext<'_>, command: &StructuralCommand) -> EditorResult<String> {
        let table = cx.container_name(command.target())?;
        Ok(format!("ALTER TABLE {}", quote_identifier(table, &self.config)))
    }
}

impl ObjectEditor for ColumnEditor {
    type Object = Column;
    type Container = Table;

    fn name(&self) -> &'static str {
        "ColumnEditor"
    }

    fn objects_cache(&self, model: &ObjectGraph, object: Handle<Column>) -> Option<CacheRef> {
        container_cache(model, object.id(), COLUMNS_CACHE)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        _context: &CommandContext,
        parent: Handle<Table>,
        copy_from: Option<Handle<Column>>,
    ) -> EditorResult<Handle<Column>> {
        allocate_object(model, parent.id(), COLUMNS_CACHE, DEFAULT_NAME, copy_from)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let column = cx.model().get(command.target())?;
        let name = cx.object_name(command.target())?;
        actions.push(PersistAction::new(
            "Add column",
            format!(
                "{} ADD COLUMN {}",
                self.alter_table(cx, command)?,
                self.declaration(name, column)
            ),
        ));
        Ok(())
    }

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let column = cx.model().get(command.target())?;
        let prefix = format!(
            "{} ALTER COLUMN {}",
            self.alter_table(cx, command)?,
            quote_identifier(cx.object_name(command.target())?, &self.config)
        );

        for (property, change) in command.changes().iter() {
            if change.is_noop() {
                continue;
            }
            match property {
                DATA_TYPE_PROPERTY => actions.push(PersistAction::new(
                    "Alter column type",
                    format!(
                        "{} TYPE {}",
                        prefix,
                        column.property_str(DATA_TYPE_PROPERTY).unwrap_or_default()
                    ),
                )),
                NULLABLE_PROPERTY => {
                    let clause = if Self::is_nullable(column) {
                        "DROP NOT NULL"
                    } else {
                        "SET NOT NULL"
                    };
                    actions.push(PersistAction::new(
                        "Alter column nullability",
                        format!("{} {}", prefix, clause),
                    ));
                }
                DEFAULT_VALUE_PROPERTY => {
                    let clause = match text_value(&column.property(DEFAULT_VALUE_PROPERTY)) {
                        Some(default) => format!("SET DEFAULT {}", default),
                        None => "DROP DEFAULT".to_string(),
                    };
                    actions.push(PersistAction::new(
                        "Alter column default",
                        format!("{} {}", prefix, clause),
                    ));
                }
                _ => {}
            }
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
        let target = format!(
            "COLUMN {}.{}",
            quote_identifier(cx.container_name(command.target())?, &self.config),
            quote_identifier(cx.object_name(command.target())?, &self.config)
        );
        actions.push(comment_action("Comment column", &target, description));
        Ok(())
    }

    fn add_object_rename_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let CommandKind::Rename { old_name, new_name } = command.kind() else {
            return Ok(());
        };
        actions.push(PersistAction::new(
            "Rename column",
            format!(
                "{} RENAME COLUMN {} TO {}",
                self.alter_table(cx, command)?,
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
            "Drop column",
            format!(
                "{} DROP COLUMN {}",
                self.alter_table(cx, command)?,
                quote_identifier(cx.object_name(command.target())?, &self.config)
            ),
        ));
        Ok(())
    }

    /// Only columns created in the same session are declared inline
    fn nested_declaration(
        &self,
        model: &ObjectGraph,
        _owner: Handle<Table>,
        command: &StructuralCommand,
    ) -> Option<String> {
        if *command.kind() != CommandKind::Create {
            return None;
        }
        let column = model.object(command.target())?;
        Some(self.declaration(column.name(), column))
    }

    fn validate_object_property(
        &self,
        _model: &ObjectGraph,
        _object: Handle<Column>,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        match property {
            NAME_PROPERTY if text_value(value).is_none() => Err(EditorError::Validation(
                "Column name cannot be empty".to_string(),
            )),
            NULLABLE_PROPERTY if !(value.is_boolean() || value.is_null()) => {
                Err(EditorError::Validation(format!(
                    "Column nullability must be true or false, got {}",
                    value
                )))
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
        let column = model.get(command.target())?;
        if column.name().trim().is_empty() {
            return Err(EditorError::Validation("Column name cannot be empty".to_string()));
        }
        if text_value(&column.property(DATA_TYPE_PROPERTY)).is_none() {
            return Err(EditorError::Validation(format!(
                "Column '{}' has no data type",
                column.name()
            )));
        }
        Ok(())
    }
}
