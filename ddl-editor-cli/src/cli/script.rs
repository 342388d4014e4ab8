// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Edit scripts
//!
//! A script describes an initial database model and a list of edits:
//!
//! ```json
//! {
//!   "model": { "schemas": [ { "name": "public", "views": [ { "name": "v1", "source": "SELECT 1" } ] } ] },
//!   "edits": [ { "op": "set", "object": "public/v1", "property": "source", "value": "SELECT 2" } ]
//! }
//! ```
//!
//! Objects are addressed by `/`-separated name paths below the database;
//! the empty path is the database itself.

use ddl_editor::model::{Column, Index, Schema, Table, View};
use ddl_editor::{
    register_all_editors, CommandContext, EditorConfig, EditorError, EditorRegistry,
    EditorResult, ObjectGraph, ObjectId, ObjectKind,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub model: ModelSpec,
    #[serde(default)]
    pub edits: Vec<Edit>,
}

impl EditScript {
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> EditorResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            EditorError::InvalidOperation(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelSpec {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub schemas: Vec<SchemaSpec>,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            database: default_database(),
            schemas: Vec::new(),
        }
    }
}

fn default_database() -> String {
    "postgres".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SchemaSpec {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub views: Vec<ViewSpec>,
}

#[derive(Debug, Deserialize)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ViewSpec {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// One user-level edit
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    Create {
        kind: ObjectKind,
        parent: String,
        #[serde(default)]
        copy_from: Option<String>,
        #[serde(default)]
        properties: Map<String, Value>,
    },
    Set {
        object: String,
        property: String,
        value: Value,
    },
    Rename {
        object: String,
        name: String,
    },
    Delete {
        object: String,
    },
    Undo,
    Redo,
}

/// Model, editors and pending commands of one script run
pub struct ScriptSession {
    pub model: ObjectGraph,
    pub registry: EditorRegistry,
    pub context: CommandContext,
    pub config: EditorConfig,
}

impl ScriptSession {
    /// Build the initial model described by `spec`
    pub fn load(spec: &ModelSpec, config: EditorConfig) -> EditorResult<Self> {
        let mut model = ObjectGraph::new(&spec.database);
        let root = model.root().id();

        for schema_spec in &spec.schemas {
            let schema = model
                .load_object::<Schema>(root, "schemas", &schema_spec.name)?
                .id();

            for table_spec in &schema_spec.tables {
                let table = model
                    .load_object::<Table>(schema, "tables", &table_spec.name)?
                    .id();
                for column_spec in &table_spec.columns {
                    let column = model
                        .load_object::<Column>(table, "columns", &column_spec.name)?
                        .id();
                    model.set_property(column, "data_type", Value::from(column_spec.data_type.as_str()))?;
                    for (property, value) in &column_spec.properties {
                        model.set_property(column, property, value.clone())?;
                    }
                }
                for index_spec in &table_spec.indexes {
                    let index = model
                        .load_object::<Index>(table, "indexes", &index_spec.name)?
                        .id();
                    model.set_property(index, "columns", Value::from(index_spec.columns.clone()))?;
                    model.set_property(index, "unique", Value::from(index_spec.unique))?;
                }
            }

            for view_spec in &schema_spec.views {
                let view = model
                    .load_object::<View>(schema, "tables", &view_spec.name)?
                    .id();
                model.set_property(view, "source", Value::from(view_spec.source.as_str()))?;
            }
        }
        log::info!("Loaded model '{}' with {} object(s)", spec.database, model.len());

        let mut registry = EditorRegistry::new();
        register_all_editors(&mut registry, &config);

        Ok(Self {
            model,
            registry,
            context: CommandContext::new(),
            config,
        })
    }

    /// Resolve a `/`-separated name path
    pub fn resolve(&self, path: &str) -> EditorResult<ObjectId> {
        let segments: Vec<&str> = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        self.model
            .resolve_path(&segments)
            .ok_or_else(|| EditorError::InvalidOperation(format!("no object at '{}'", path)))
    }

    /// Apply edits in order, stopping at the first failure
    pub fn apply(&mut self, edits: &[Edit]) -> Result<(), Box<dyn std::error::Error>> {
        for (index, edit) in edits.iter().enumerate() {
            log::debug!("Applying edit {}: {:?}", index + 1, edit);
            self.apply_edit(edit)
                .map_err(|e| format!("edit {} failed: {}", index + 1, e))?;
        }
        Ok(())
    }

    fn apply_edit(&mut self, edit: &Edit) -> EditorResult<()> {
        match edit {
            Edit::Create {
                kind,
                parent,
                copy_from,
                properties,
            } => {
                let parent = self.resolve(parent)?;
                let copy_from = copy_from.as_deref().map(|p| self.resolve(p)).transpose()?;
                let editor = self.registry.editor_for(*kind)?.clone();
                let object =
                    editor.create_new_object(&mut self.model, &mut self.context, parent, copy_from)?;

                // The name goes first so later edits can address the object by path
                if let Some(name) = properties.get("name") {
                    editor.set_property(&mut self.model, &mut self.context, object, "name", name.clone())?;
                }
                for (property, value) in properties.iter().filter(|(p, _)| p.as_str() != "name") {
                    editor.set_property(&mut self.model, &mut self.context, object, property, value.clone())?;
                }
            }
            Edit::Set {
                object,
                property,
                value,
            } => {
                let object = self.resolve(object)?;
                let editor = self.registry.editor_for_object(&self.model, object)?.clone();
                editor.set_property(&mut self.model, &mut self.context, object, property, value.clone())?;
            }
            Edit::Rename { object, name } => {
                let object = self.resolve(object)?;
                let editor = self.registry.editor_for_object(&self.model, object)?.clone();
                editor.rename_object(&mut self.model, &mut self.context, object, name)?;
            }
            Edit::Delete { object } => {
                let object = self.resolve(object)?;
                let editor = self.registry.editor_for_object(&self.model, object)?.clone();
                editor.delete_object(&mut self.model, &mut self.context, object)?;
            }
            Edit::Undo => {
                if !self.context.undo(&mut self.model)? {
                    log::warn!("Nothing to undo");
                }
            }
            Edit::Redo => {
                if !self.context.redo(&mut self.model)? {
                    log::warn!("Nothing to redo");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddl_editor::ProgressMonitor;

    const SCRIPT: &str = r#"{
        "model": {
            "schemas": [{
                "name": "public",
                "tables": [{
                    "name": "orders",
                    "columns": [{ "name": "id", "data_type": "bigint" }],
                    "indexes": [{ "name": "orders_pkey", "columns": ["id"], "unique": true }]
                }],
                "views": [{ "name": "v1", "source": "SELECT 1" }]
            }]
        },
        "edits": [
            { "op": "set", "object": "public/v1", "property": "source", "value": "SELECT 2" },
            { "op": "create", "kind": "column", "parent": "public/orders",
              "properties": { "name": "note", "data_type": "text" } },
            { "op": "rename", "object": "public/orders/note", "name": "remark" },
            { "op": "delete", "object": "public/orders/orders_pkey" },
            { "op": "undo" }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script = EditScript::from_json_str(SCRIPT).unwrap();
        assert_eq!(script.model.database, "postgres");
        assert_eq!(script.model.schemas[0].tables[0].columns.len(), 1);
        assert_eq!(script.edits.len(), 5);
        assert!(matches!(script.edits[4], Edit::Undo));
    }

    #[test]
    fn test_apply_script() {
        let script = EditScript::from_json_str(SCRIPT).unwrap();
        let mut session = ScriptSession::load(&script.model, EditorConfig::default()).unwrap();
        session.apply(&script.edits).unwrap();

        // The undone delete leaves two commands: the view change and the new column
        assert_eq!(session.context.len(), 2);
        assert!(session.resolve("public/orders/orders_pkey").is_ok());

        let plan = session
            .context
            .prepare_commit(&session.model, &ProgressMonitor::new())
            .unwrap();
        let scripts: Vec<&str> = plan.actions().map(|a| a.script()).collect();
        assert_eq!(
            scripts,
            vec![
                "CREATE OR REPLACE VIEW v1\nAS SELECT 2",
                "ALTER TABLE orders ADD COLUMN remark text",
            ]
        );
    }

    #[test]
    fn test_failed_edit_names_its_position() {
        let script = EditScript::from_json_str(
            r#"{ "edits": [ { "op": "delete", "object": "public/missing" } ] }"#,
        )
        .unwrap();
        let mut session = ScriptSession::load(&script.model, EditorConfig::default()).unwrap();

        let err = session.apply(&script.edits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "edit 1 failed: Invalid operation: no object at 'public/missing'"
        );
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let err = EditScript::from_json_str(r#"{ "edits": [ { "op": "truncate" } ] }"#).unwrap_err();
        assert!(matches!(err, EditorError::Serialization(_)));
    }

    #[test]
    fn test_script_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();
        let script = EditScript::from_file(file.path()).unwrap();
        assert_eq!(script.edits.len(), 5);
    }
}
