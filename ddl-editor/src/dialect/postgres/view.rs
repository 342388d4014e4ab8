// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! View editor
//!
//! Views live in their schema's table cache. Creation and modification both
//! emit `CREATE OR REPLACE VIEW`; renaming is not supported.

use super::naming::{comment_action, quote_identifier, text_value};
use super::{allocate_object, container_cache, DESCRIPTION_PROPERTY};
use crate::command::{CommandContext, PersistAction, ProgressMonitor, StructuralCommand};
use crate::config::EditorConfig;
use crate::editor::{ObjectEditor, PersistContext};
use crate::error::{EditorError, EditorResult};
use crate::model::{CacheRef, Handle, ObjectGraph, Schema, View, NAME_PROPERTY};
use serde_json::Value;

/// Property holding the view's query text
pub const SOURCE_PROPERTY: &str = "source";

const TABLES_CACHE: &str = "tables";
const DEFAULT_NAME: &str = "NewView";

#[derive(Debug, Clone, Default)]
pub struct ViewEditor {
    config: EditorConfig,
}

impl ViewEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn create_or_replace(&self, cx: &PersistContext<'_>, view: Handle<View>) -> EditorResult<PersistAction> {
        let object = cx.model().get(view.id())?;
        let source = object.property_str(SOURCE_PROPERTY).unwrap_or_default();
        let script = format!(
            "CREATE OR REPLACE VIEW {}{}AS {}",
            quote_identifier(cx.object_name(view.id())?, &self.config),
            self.config.line_separator,
            source
        );
        Ok(PersistAction::new("Create view", script))
    }
}

impl ObjectEditor for ViewEditor {
    type Object = View;
    type Container = Schema;

    fn name(&self) -> &'static str {
        "ViewEditor"
    }

    fn objects_cache(&self, model: &ObjectGraph, object: Handle<View>) -> Option<CacheRef> {
        container_cache(model, object.id(), TABLES_CACHE)
    }

    fn create_database_object(
        &self,
        model: &mut ObjectGraph,
        _context: &CommandContext,
        parent: Handle<Schema>,
        copy_from: Option<Handle<View>>,
    ) -> EditorResult<Handle<View>> {
        allocate_object(model, parent.id(), TABLES_CACHE, DEFAULT_NAME, copy_from)
    }

    fn add_object_create_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let view = command.target_as::<View>()?;
        actions.push(self.create_or_replace(cx, view)?);
        Ok(())
    }

    fn add_object_modify_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let only_comment = command
            .changes()
            .properties()
            .all(|p| p == DESCRIPTION_PROPERTY);
        if only_comment {
            return Ok(());
        }
        let view = command.target_as::<View>()?;
        actions.push(self.create_or_replace(cx, view)?);
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
        let name = cx.object_name(command.target())?;
        let target = format!("VIEW {}", quote_identifier(name, &self.config));
        actions.push(comment_action("Comment view", &target, description));
        Ok(())
    }

    fn add_object_delete_actions(
        &self,
        cx: &mut PersistContext<'_>,
        actions: &mut Vec<PersistAction>,
        command: &StructuralCommand,
    ) -> EditorResult<()> {
        let name = cx.object_name(command.target())?;
        actions.push(PersistAction::new(
            "Drop view",
            format!("DROP VIEW {}", quote_identifier(name, &self.config)),
        ));
        Ok(())
    }

    fn validate_object_property(
        &self,
        _model: &ObjectGraph,
        _object: Handle<View>,
        property: &str,
        value: &Value,
    ) -> EditorResult<()> {
        if property == NAME_PROPERTY && text_value(value).is_none() {
            return Err(EditorError::Validation("View name cannot be empty".to_string()));
        }
        Ok(())
    }

    fn validate_object_properties(
        &self,
        model: &ObjectGraph,
        command: &StructuralCommand,
        _progress: &ProgressMonitor,
    ) -> EditorResult<()> {
        let object = model.get(command.target())?;
        if object.name().trim().is_empty() {
            return Err(EditorError::Validation("View name cannot be empty".to_string()));
        }
        if text_value(&object.property(SOURCE_PROPERTY)).is_none() {
            return Err(EditorError::Validation(
                "View definition cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TypedEditor;

    fn fixture() -> (ObjectGraph, Handle<Schema>, TypedEditor<ViewEditor>) {
        let mut model = ObjectGraph::new("postgres");
        let root = model.root().id();
        let schema = model.load_object::<Schema>(root, "schemas", "public").unwrap();
        (model, schema, TypedEditor::new(ViewEditor::default()))
    }

    #[test]
    fn test_default_names_are_unique() {
        let (mut model, schema, editor) = fixture();
        let mut context = CommandContext::new();

        let first = editor
            .create_new_object(&mut model, &mut context, schema, None)
            .unwrap();
        let second = editor
            .create_new_object(&mut model, &mut context, schema, None)
            .unwrap();

        assert_eq!(model.get(first.id()).unwrap().name(), "NewView");
        assert_eq!(model.get(second.id()).unwrap().name(), "NewView2");
    }

    #[test]
    fn test_copy_takes_source_definition() {
        let (mut model, schema, editor) = fixture();
        let original = model
            .load_object::<View>(schema.id(), TABLES_CACHE, "totals")
            .unwrap();
        model
            .set_property(original.id(), SOURCE_PROPERTY, Value::from("SELECT 1"))
            .unwrap();

        let mut context = CommandContext::new();
        let copy = editor
            .create_new_object(&mut model, &mut context, schema, Some(original))
            .unwrap();

        let object = model.get(copy.id()).unwrap();
        assert_eq!(object.name(), "totals_copy");
        assert_eq!(object.property_str(SOURCE_PROPERTY), Some("SELECT 1"));
    }

    #[test]
    fn test_comment_only_change_skips_replace() {
        let (mut model, schema, editor) = fixture();
        let view = model
            .load_object::<View>(schema.id(), TABLES_CACHE, "v1")
            .unwrap();
        model
            .set_property(view.id(), SOURCE_PROPERTY, Value::from("SELECT 1"))
            .unwrap();

        let mut context = CommandContext::new();
        let id = editor
            .set_property(&mut model, &mut context, view, DESCRIPTION_PROPERTY, Value::from("totals"))
            .unwrap();
        let actions = context
            .command(id)
            .unwrap()
            .standalone_persist_actions(&model)
            .unwrap();

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), "Comment view");
        assert_eq!(actions[0].script(), "COMMENT ON VIEW v1 IS 'totals'");
    }

    #[test]
    fn test_blank_name_rejected_on_edit() {
        let (mut model, schema, editor) = fixture();
        let view = model
            .load_object::<View>(schema.id(), TABLES_CACHE, "v1")
            .unwrap();

        let mut context = CommandContext::new();
        let err = editor
            .rename_object(&mut model, &mut context, view, "  ")
            .unwrap_err();
        assert_eq!(err.to_string(), "View name cannot be empty");
        assert!(context.is_empty());
    }
}
