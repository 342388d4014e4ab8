// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
// DDL generation configuration

use crate::error::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When identifiers are wrapped in double quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierQuoting {
    /// Emit names as they are
    Never,
    /// Quote names that are not plain lower-case identifiers or are reserved words
    AsNeeded,
    /// Quote every name
    Always,
}

impl Default for IdentifierQuoting {
    fn default() -> Self {
        IdentifierQuoting::AsNeeded
    }
}

/// Configuration for DDL generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Separator between clauses of one statement and between statements of a script
    pub line_separator: String,

    /// Appended to each statement when a plan is rendered as a script
    pub statement_delimiter: String,

    /// Identifier quoting policy
    pub identifier_quoting: IdentifierQuoting,

    /// Indentation of nested declarations inside a parent statement
    pub indent: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            line_separator: "\n".to_string(),
            statement_delimiter: ";".to_string(),
            identifier_quoting: IdentifierQuoting::AsNeeded,
            indent: 4,
        }
    }
}

impl EditorConfig {
    /// Single-line statements, no indentation
    pub fn compact() -> Self {
        Self {
            line_separator: " ".to_string(),
            indent: 0,
            ..Self::default()
        }
    }

    /// Quote every identifier
    pub fn strict_quoting() -> Self {
        Self {
            identifier_quoting: IdentifierQuoting::Always,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::Config(format!("invalid editor configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EditorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded editor configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    fn validate(&self) -> EditorResult<()> {
        if self.line_separator.is_empty() {
            return Err(EditorError::Config(
                "line_separator cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Indentation prefix for nested declarations
    pub fn indentation(&self) -> String {
        " ".repeat(self.indent)
    }
}
