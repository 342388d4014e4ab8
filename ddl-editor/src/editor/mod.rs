// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Object editors: per-kind hooks and the orchestration around them

pub mod dynamic;
pub mod persist;
pub mod registry;
pub mod traits;

pub use dynamic::{DynObjectEditor, EditorHandle, TypedEditor};
pub use persist::PersistContext;
pub use registry::EditorRegistry;
pub use traits::ObjectEditor;
