// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! DDL Editor - structural editing of database metadata
//!
//! Edits of database objects (create, delete, rename, property changes) are
//! recorded as structural commands in a [`CommandContext`]. Each command is
//! mirrored onto the in-memory object model right away, can be undone and
//! redone, and is turned into DDL persist actions by the editor of its object
//! kind when the session is committed.
//!
//! # Features
//!
//! - **Typed editors**: an [`ObjectEditor`] binds one object type to one
//!   container type; a table editor cannot be handed a schema as target
//! - **Change merging**: repeated edits of one object fold into a single
//!   command that remembers the first old value
//! - **Validation first**: every pending command is validated before any DDL
//!   is generated
//! - **Nested declarations**: columns created with their table are declared
//!   inline in `CREATE TABLE`
//! - **Two-phase commit**: plan, execute through an [`ActionExecutor`], then
//!   apply the outcome to the model
//!
//! # Usage
//!
//! ```ignore
//! let mut model = ObjectGraph::new("postgres");
//! let public = model.load_object::<Schema>(model.root().id(), "schemas", "public")?;
//!
//! let mut registry = EditorRegistry::new();
//! register_all_editors(&mut registry, &EditorConfig::default());
//!
//! let mut context = CommandContext::new();
//! let views = registry.editor_for(ObjectKind::View)?;
//! let view = views.create_new_object(&mut model, &mut context, public.id(), None)?;
//! views.set_property(&mut model, &mut context, view, "source", "SELECT 1".into())?;
//!
//! let mut collector = ScriptCollector::new();
//! context.commit(&mut model, &mut collector, &ProgressMonitor::new())?;
//! ```

pub mod command;
pub mod config;
pub mod dialect;
pub mod editor;
pub mod error;
pub mod model;

pub use command::{
    execute_plan, ActionExecutor, CommandContext, CommandId, CommandKind, CommitOutcome,
    CommitPlan, PersistAction, ProgressMonitor, ScriptCollector, StructuralCommand,
};
pub use config::{EditorConfig, IdentifierQuoting};
pub use dialect::postgres::register_all_editors;
pub use editor::{EditorHandle, EditorRegistry, ObjectEditor, PersistContext, TypedEditor};
pub use error::{EditorError, EditorResult};
pub use model::{Handle, ModelEvent, ObjectGraph, ObjectId, ObjectKind};

/// DDL Editor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// DDL Editor crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
