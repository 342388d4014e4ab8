//! Undo/redo, rollback and commit behavior of the command context

#[path = "testutils/mod.rs"]
mod testutils;

use ddl_editor::command::{
    execute_plan, CommandReflector, DeleteObjectReflector, PersistAction, ScriptCollector,
    StructuralCommand,
};
use ddl_editor::{EditorError, EditorResult, ObjectGraph, ObjectKind, ProgressMonitor};
use serde_json::Value;
use std::sync::Arc;
use testutils::editor_fixture::EditorFixture;

/// Reflector whose deferred application always fails
struct ReadOnlyReflector;

impl CommandReflector for ReadOnlyReflector {
    fn redo(&self, _model: &mut ObjectGraph, _command: &StructuralCommand) -> EditorResult<()> {
        Err(EditorError::InvalidOperation("model is read-only".to_string()))
    }

    fn undo(&self, _model: &mut ObjectGraph, _command: &StructuralCommand) -> EditorResult<()> {
        Ok(())
    }
}

#[test]
fn test_undo_redo_create() {
    let mut fixture = EditorFixture::new();
    let schema = fixture.schema;

    let view = fixture.create(ObjectKind::View, schema).unwrap();
    assert_eq!(fixture.find("NewView"), Some(view));
    assert!(fixture.context.can_undo());

    assert!(fixture.context.undo(&mut fixture.model).unwrap());
    assert_eq!(fixture.find("NewView"), None);
    assert!(fixture.context.is_empty());
    assert!(fixture.context.can_redo());

    assert!(fixture.context.redo(&mut fixture.model).unwrap());
    assert_eq!(fixture.find("NewView"), Some(view));

    // The redone create is pending again, so edits extend it
    fixture.set(view, "source", "SELECT 1").unwrap();
    assert_eq!(fixture.context.len(), 1);
}

#[test]
fn test_undo_redo_delete() {
    let mut fixture = EditorFixture::new();
    let view = fixture.load_view("v1", "SELECT 1");

    fixture.delete(view).unwrap();
    assert_eq!(fixture.find("v1"), None);

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(fixture.find("v1"), Some(view));
    assert!(fixture.scripts().unwrap().is_empty());

    fixture.context.redo(&mut fixture.model).unwrap();
    assert_eq!(fixture.find("v1"), None);
    assert_eq!(fixture.scripts().unwrap(), vec!["DROP VIEW v1".to_string()]);
}

#[test]
fn test_undo_redo_rename() {
    let mut fixture = EditorFixture::new();
    let table = fixture.load_table("orders", &["id"]);

    fixture.rename(table, "order_archive").unwrap();
    assert_eq!(fixture.find("order_archive"), Some(table));

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(fixture.find("orders"), Some(table));
    assert_eq!(fixture.find("order_archive"), None);

    fixture.context.redo(&mut fixture.model).unwrap();
    assert_eq!(fixture.model.get(table).unwrap().name(), "order_archive");
}

#[test]
fn test_undo_property_change_restores_old_value() {
    let mut fixture = EditorFixture::new();
    let view = fixture.load_view("v1", "SELECT 0");

    fixture.set(view, "source", "SELECT 1").unwrap();
    fixture.set(view, "source", "SELECT 2").unwrap();
    assert_eq!(
        fixture.model.property(view, "source").unwrap(),
        Value::from("SELECT 2")
    );

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(
        fixture.model.property(view, "source").unwrap(),
        Value::from("SELECT 0")
    );

    // After undo the next edit starts a fresh change command
    fixture.set(view, "source", "SELECT 3").unwrap();
    assert_eq!(fixture.context.len(), 1);
    assert!(!fixture.context.can_redo());
}

#[test]
fn test_rollback_restores_model() {
    let mut fixture = EditorFixture::new();
    let schema = fixture.schema;
    let existing = fixture.load_view("v1", "SELECT 1");

    let created = fixture.create(ObjectKind::View, schema).unwrap();
    fixture.set(existing, "source", "SELECT 2").unwrap();
    fixture.delete(existing).unwrap();

    fixture.context.rollback(&mut fixture.model).unwrap();

    assert!(fixture.context.is_empty());
    assert!(!fixture.context.can_redo());
    assert_eq!(fixture.find("v1"), Some(existing));
    assert_eq!(fixture.find("NewView"), None);
    assert!(!fixture.model.get(created).unwrap().is_persisted());
    assert_eq!(
        fixture.model.property(existing, "source").unwrap(),
        Value::from("SELECT 1")
    );
}

#[test]
fn test_validation_runs_before_generation() {
    let mut fixture = EditorFixture::new();
    let schema = fixture.schema;
    let good = fixture.load_view("v1", "SELECT 1");
    fixture.delete(good).unwrap();

    // Invalid command registered after a valid one
    fixture.create(ObjectKind::View, schema).unwrap();

    let err = fixture.plan().unwrap_err();
    assert_eq!(err.to_string(), "View definition cannot be empty");
    assert_eq!(fixture.context.len(), 2);
}

#[test]
fn test_execution_failure_keeps_failed_commands_pending() {
    let mut fixture = EditorFixture::new();
    let first = fixture.load_view("v1", "SELECT 1");
    let second = fixture.load_view("v2", "SELECT 2");
    fixture.delete(first).unwrap();
    fixture.delete(second).unwrap();

    let mut executor = |action: &PersistAction| {
        if action.script() == "DROP VIEW v2" {
            Err("view v2 is referenced by report".to_string())
        } else {
            Ok(())
        }
    };
    let err = fixture
        .context
        .commit(&mut fixture.model, &mut executor, &ProgressMonitor::new())
        .unwrap_err();

    let EditorError::Execution(failure) = err else {
        panic!("expected execution failure");
    };
    assert_eq!(failure.action_title, "Drop view");
    assert_eq!(failure.reason, "view v2 is referenced by report");

    // The first drop is done; the failed one can still be undone
    assert_eq!(fixture.context.len(), 1);
    assert!(!fixture.context.is_committing());
    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(fixture.find("v2"), Some(second));
    assert_eq!(fixture.find("v1"), None);
}

#[test]
fn test_cancellation_between_actions() {
    let mut fixture = EditorFixture::new();
    let first = fixture.load_view("v1", "SELECT 1");
    let second = fixture.load_view("v2", "SELECT 2");
    fixture.delete(first).unwrap();
    fixture.delete(second).unwrap();

    let progress = ProgressMonitor::new();
    let plan = fixture
        .context
        .prepare_commit(&fixture.model, &progress)
        .unwrap();

    // Edits are refused while a plan is out
    let err = fixture.set(first, "source", "SELECT 3").unwrap_err();
    assert!(matches!(err, EditorError::InvalidOperation(_)));

    let canceller = progress.clone();
    let mut executor = |_: &PersistAction| {
        canceller.cancel();
        Ok(())
    };
    let outcome = execute_plan(&plan, &mut executor, &progress);
    assert!(outcome.cancelled);
    assert_eq!(outcome.executed_actions, 1);

    fixture
        .context
        .finish_commit(&mut fixture.model, &outcome)
        .unwrap();
    assert_eq!(fixture.context.len(), 1);
}

#[test]
fn test_commit_on_worker_thread() {
    let mut fixture = EditorFixture::new();
    let view = fixture.load_view("v1", "SELECT 1");
    fixture.set(view, "source", "SELECT 2").unwrap();

    let plan = fixture
        .context
        .prepare_commit(&fixture.model, &ProgressMonitor::new())
        .unwrap();
    let (outcome, actions) = std::thread::spawn(move || {
        let mut collector = ScriptCollector::new();
        let outcome = execute_plan(&plan, &mut collector, &ProgressMonitor::new());
        (outcome, collector.into_actions())
    })
    .join()
    .unwrap();

    assert!(outcome.is_success());
    assert_eq!(actions.len(), 1);
    fixture
        .context
        .finish_commit(&mut fixture.model, &outcome)
        .unwrap();
    assert!(fixture.context.is_empty());
    assert_eq!(
        fixture.model.property(view, "source").unwrap(),
        Value::from("SELECT 2")
    );
}

#[test]
fn test_plan_script_uses_config() {
    let mut fixture = EditorFixture::new();
    let first = fixture.load_view("v1", "SELECT 1");
    let second = fixture.load_view("v2", "SELECT 2");
    fixture.delete(first).unwrap();
    fixture.delete(second).unwrap();

    let plan = fixture.plan().unwrap();
    assert_eq!(
        plan.script(&fixture.config),
        "DROP VIEW v1;\nDROP VIEW v2;"
    );
}

#[test]
fn test_undo_unwinds_rename_merged_into_older_create() {
    let mut fixture = EditorFixture::new();
    let schema = fixture.schema;
    let old = fixture.load_view("v1", "SELECT 1");

    let new = fixture.create(ObjectKind::View, schema).unwrap();
    fixture.set(new, "source", "SELECT 2").unwrap();
    fixture.delete(old).unwrap();
    fixture.rename(new, "v1").unwrap();

    // The rename extends the pending create
    assert_eq!(fixture.context.len(), 2);
    assert_eq!(fixture.find("v1"), Some(new));

    assert!(fixture.context.undo(&mut fixture.model).unwrap());
    assert_eq!(fixture.find("NewView"), Some(new));
    assert_eq!(fixture.find("v1"), None);
    assert_eq!(fixture.context.len(), 2);

    assert!(fixture.context.undo(&mut fixture.model).unwrap());
    assert_eq!(fixture.find("v1"), Some(old));

    assert!(fixture.context.undo(&mut fixture.model).unwrap());
    assert_eq!(fixture.find("NewView"), None);
    assert!(fixture.context.is_empty());
    assert!(!fixture.context.undo(&mut fixture.model).unwrap());

    while fixture.context.redo(&mut fixture.model).unwrap() {}
    assert_eq!(fixture.find("v1"), Some(new));
    assert_eq!(fixture.context.len(), 2);
    let create = fixture.context.commands().next().unwrap();
    assert_eq!(
        create.changes().new_value("name"),
        Some(&Value::from("v1"))
    );
}

#[test]
fn test_rollback_after_rename_merged_into_older_create() {
    let mut fixture = EditorFixture::new();
    let schema = fixture.schema;
    let old = fixture.load_view("v1", "SELECT 1");

    let new = fixture.create(ObjectKind::View, schema).unwrap();
    fixture.delete(old).unwrap();
    fixture.rename(new, "v1").unwrap();

    fixture.context.rollback(&mut fixture.model).unwrap();
    assert!(fixture.context.is_empty());
    assert_eq!(fixture.find("v1"), Some(old));
    assert_eq!(fixture.model.get(new).unwrap().name(), "NewView");
    assert!(!fixture.model.get(new).unwrap().is_persisted());
}

#[test]
fn test_undo_reverts_merged_property_edit_first() {
    let mut fixture = EditorFixture::new();
    let view = fixture.load_view("v1", "SELECT 1");
    let table = fixture.load_table("orders", &["id"]);

    fixture.set(view, "source", "SELECT 2").unwrap();
    fixture.delete(table).unwrap();
    fixture.set(view, "source", "SELECT 3").unwrap();
    assert_eq!(fixture.context.len(), 2);

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(
        fixture.model.property(view, "source").unwrap(),
        Value::from("SELECT 2")
    );
    let change = fixture.context.commands().next().unwrap().changes().get("source").unwrap();
    assert_eq!(change.old_value, Value::from("SELECT 1"));
    assert_eq!(change.new_value, Value::from("SELECT 2"));
    assert_eq!(fixture.find("orders"), None);

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(fixture.find("orders"), Some(table));

    fixture.context.undo(&mut fixture.model).unwrap();
    assert_eq!(
        fixture.model.property(view, "source").unwrap(),
        Value::from("SELECT 1")
    );
    assert!(fixture.context.is_empty());
}

#[test]
fn test_statements_use_names_at_their_position() {
    let mut fixture = EditorFixture::new();
    let table = fixture.load_table("orders", &["amount", "note"]);
    let amount = fixture.model.find_child(table, "amount").unwrap();
    let note = fixture.model.find_child(table, "note").unwrap();

    fixture.set(amount, "data_type", "bigint").unwrap();
    fixture.rename(table, "archive").unwrap();
    fixture.delete(note).unwrap();

    assert_eq!(
        fixture.scripts().unwrap(),
        vec![
            "ALTER TABLE orders ALTER COLUMN amount TYPE bigint".to_string(),
            "ALTER TABLE orders RENAME TO archive".to_string(),
            "ALTER TABLE archive DROP COLUMN note".to_string(),
        ]
    );
}

#[test]
fn test_chained_renames_keep_statement_order() {
    let mut fixture = EditorFixture::new();
    let table = fixture.load_table("orders", &["amount"]);
    let amount = fixture.model.find_child(table, "amount").unwrap();

    fixture.rename(amount, "total").unwrap();
    fixture.rename(table, "archive").unwrap();
    fixture.rename(table, "history").unwrap();

    assert_eq!(
        fixture.scripts().unwrap(),
        vec![
            "ALTER TABLE orders RENAME COLUMN amount TO total".to_string(),
            "ALTER TABLE orders RENAME TO archive".to_string(),
            "ALTER TABLE archive RENAME TO history".to_string(),
        ]
    );
}

#[test]
fn test_finish_commit_applies_every_executed_command() {
    let mut fixture = EditorFixture::new();
    let table = fixture.load_table("orders", &["id"]);
    let view = fixture.load_view("v1", "SELECT 1");

    let tables = fixture.editor(ObjectKind::Table);
    let command = StructuralCommand::delete(tables.as_dyn().clone(), table, "Delete object");
    fixture
        .context
        .add_command(&mut fixture.model, command, Arc::new(ReadOnlyReflector), false)
        .unwrap();
    let views = fixture.editor(ObjectKind::View);
    let command = StructuralCommand::delete(views.as_dyn().clone(), view, "Delete object");
    fixture
        .context
        .add_command(&mut fixture.model, command, Arc::new(DeleteObjectReflector), false)
        .unwrap();

    let progress = ProgressMonitor::new();
    let plan = fixture
        .context
        .prepare_commit(&fixture.model, &progress)
        .unwrap();
    let mut collector = ScriptCollector::new();
    let outcome = execute_plan(&plan, &mut collector, &progress);
    assert!(outcome.is_success());

    let err = fixture
        .context
        .finish_commit(&mut fixture.model, &outcome)
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid operation: model is read-only");
    assert!(fixture.context.is_empty());
    assert!(!fixture.context.can_undo());
    assert_eq!(fixture.find("v1"), None);
}
