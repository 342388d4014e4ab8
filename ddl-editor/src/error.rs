// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the object editing framework

use crate::command::commit::ExecutionFailure;
use crate::model::{ObjectId, ObjectKind};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EditorError {
    /// Raised by validation hooks before any DDL is generated.
    /// Displays the bare reason so it can be shown to the user as is.
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(
        "Can't create object here. Wrong container type for {editor}: expected {expected}, got {actual}"
    )]
    ContainerTypeMismatch {
        editor: &'static str,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    #[error("Execution failed: {0}")]
    Execution(ExecutionFailure),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("No editor registered for object kind: {0}")]
    EditorNotFound(ObjectKind),

    #[error("Duplicate object: {0}")]
    DuplicateObject(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EditorError {
    /// Validation and unsupported-operation failures leave the session usable:
    /// the offending command is simply not committed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EditorError::Validation(_)
                | EditorError::UnsupportedOperation(_)
                | EditorError::Cancelled
                | EditorError::Execution(_)
        )
    }
}

impl From<ExecutionFailure> for EditorError {
    fn from(failure: ExecutionFailure) -> Self {
        EditorError::Execution(failure)
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        EditorError::Config(err.to_string())
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
