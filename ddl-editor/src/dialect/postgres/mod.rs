// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! PostgreSQL editors
//!
//! Each editor handles one object kind and renders its commands as
//! PostgreSQL DDL. Object names are emitted unqualified.

mod column;
mod index;
pub mod naming;
mod schema;
mod table;
mod view;

pub use column::{ColumnEditor, DATA_TYPE_PROPERTY, DEFAULT_VALUE_PROPERTY, NULLABLE_PROPERTY};
pub use index::{IndexEditor, COLUMNS_PROPERTY, UNIQUE_PROPERTY};
pub use naming::{quote_identifier, quote_literal};
pub use schema::{SchemaEditor, OWNER_PROPERTY};
pub use table::TableEditor;
pub use view::{ViewEditor, SOURCE_PROPERTY};

use crate::config::EditorConfig;
use crate::editor::EditorRegistry;
use crate::error::EditorResult;
use crate::model::{CacheRef, Handle, ObjectGraph, ObjectId, ObjectType};

/// Property holding an object's comment
pub const DESCRIPTION_PROPERTY: &str = "description";

/// Register every PostgreSQL editor
///
/// # Arguments
/// * `registry` - Registry to add the editors to
/// * `config` - DDL formatting used by all editors
pub fn register_all_editors(registry: &mut EditorRegistry, config: &EditorConfig) {
    registry.register(SchemaEditor::new(config.clone()));
    registry.register(TableEditor::new(config.clone()));
    registry.register(ColumnEditor::new(config.clone()));
    registry.register(ViewEditor::new(config.clone()));
    registry.register(IndexEditor::new(config.clone()));
}

/// Cache named `cache` in the container of `object`
pub(crate) fn container_cache(
    model: &ObjectGraph,
    object: ObjectId,
    cache: &'static str,
) -> Option<CacheRef> {
    let container = model.object(object)?.container()?;
    Some(CacheRef::new(container, cache))
}

/// Allocate a new object with a name unique in `cache` of `parent`.
///
/// A copy takes the source's properties and is named after it.
pub(crate) fn allocate_object<T: ObjectType>(
    model: &mut ObjectGraph,
    parent: ObjectId,
    cache: &'static str,
    default_name: &str,
    copy_from: Option<Handle<T>>,
) -> EditorResult<Handle<T>> {
    let cache = CacheRef::new(parent, cache);
    match copy_from {
        Some(source) => {
            let base = format!("{}_copy", model.get(source.id())?.name());
            let name = model.unique_name(&cache, &base);
            model.copy_object(source, parent, &name)
        }
        None => {
            let name = model.unique_name(&cache, default_name);
            model.create_object::<T>(parent, &name)
        }
    }
}
