//! Editor fixture for DDL Editor integration tests
//!
//! Uses only the public crate API.

#![allow(dead_code)]

use ddl_editor::command::ProgressMonitor;
use ddl_editor::model::{Column, Schema, Table, View};
use ddl_editor::{
    register_all_editors, CommandContext, CommitPlan, EditorConfig, EditorHandle,
    EditorRegistry, EditorResult, ObjectGraph, ObjectId, ObjectKind,
};
use serde_json::Value;

/// Isolated editing session over a fresh object graph
pub struct EditorFixture {
    pub model: ObjectGraph,
    pub registry: EditorRegistry,
    pub context: CommandContext,
    pub config: EditorConfig,
    pub schema: ObjectId,
}

impl EditorFixture {
    /// Fixture with the default configuration
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut model = ObjectGraph::new("postgres");
        let root = model.root().id();
        let schema = model
            .load_object::<Schema>(root, "schemas", "public")
            .expect("Failed to load public schema")
            .id();

        let mut registry = EditorRegistry::new();
        register_all_editors(&mut registry, &config);

        Self {
            model,
            registry,
            context: CommandContext::new(),
            config,
            schema,
        }
    }

    /// Register an existing view in the public schema
    pub fn load_view(&mut self, name: &str, source: &str) -> ObjectId {
        let view = self
            .model
            .load_object::<View>(self.schema, "tables", name)
            .expect("Failed to load view")
            .id();
        self.model
            .set_property(view, "source", Value::from(source))
            .expect("Failed to set view source");
        view
    }

    /// Register an existing table with `integer` columns
    pub fn load_table(&mut self, name: &str, columns: &[&str]) -> ObjectId {
        let table = self
            .model
            .load_object::<Table>(self.schema, "tables", name)
            .expect("Failed to load table")
            .id();
        for column in columns {
            let id = self
                .model
                .load_object::<Column>(table, "columns", column)
                .expect("Failed to load column")
                .id();
            self.model
                .set_property(id, "data_type", Value::from("integer"))
                .expect("Failed to set column type");
        }
        table
    }

    pub fn editor(&self, kind: ObjectKind) -> EditorHandle {
        self.registry
            .editor_for(kind)
            .expect("Editor not registered")
            .clone()
    }

    pub fn create(&mut self, kind: ObjectKind, parent: ObjectId) -> EditorResult<ObjectId> {
        let editor = self.editor(kind);
        editor.create_new_object(&mut self.model, &mut self.context, parent, None)
    }

    pub fn set(&mut self, object: ObjectId, property: &str, value: impl Into<Value>) -> EditorResult<()> {
        let editor = self.registry.editor_for_object(&self.model, object)?.clone();
        editor
            .set_property(&mut self.model, &mut self.context, object, property, value.into())
            .map(|_| ())
    }

    pub fn rename(&mut self, object: ObjectId, new_name: &str) -> EditorResult<()> {
        let editor = self.registry.editor_for_object(&self.model, object)?.clone();
        editor
            .rename_object(&mut self.model, &mut self.context, object, new_name)
            .map(|_| ())
    }

    pub fn delete(&mut self, object: ObjectId) -> EditorResult<()> {
        let editor = self.registry.editor_for_object(&self.model, object)?.clone();
        editor
            .delete_object(&mut self.model, &mut self.context, object)
            .map(|_| ())
    }

    /// Prepare a commit and release the lock right away
    pub fn plan(&mut self) -> EditorResult<CommitPlan> {
        let plan = self
            .context
            .prepare_commit(&self.model, &ProgressMonitor::new())?;
        self.context.abort_commit();
        Ok(plan)
    }

    /// Scripts of the pending plan, in execution order
    pub fn scripts(&mut self) -> EditorResult<Vec<String>> {
        Ok(self
            .plan()?
            .actions()
            .map(|a| a.script().to_string())
            .collect())
    }

    /// Name of an object, if it is cached in the public schema
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.model.resolve_path(&["public", name])
    }
}
