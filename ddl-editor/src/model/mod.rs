// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Object metadata model edited by the framework

pub mod cache;
pub mod graph;
pub mod object;

pub use cache::{CacheRef, ObjectCache};
pub use graph::{ModelEvent, ObjectGraph};
pub use object::{
    Column, Database, DatabaseObject, Handle, Index, ObjectId, ObjectKind, ObjectType, Schema,
    Table, View, NAME_PROPERTY,
};
