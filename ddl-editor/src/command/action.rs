// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Persist actions: atomic units of generated DDL

use serde::{Deserialize, Serialize};
use std::fmt;

/// One DDL statement plus a human-readable title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistAction {
    title: String,
    script: String,
}

impl PersistAction {
    pub fn new(title: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            script: script.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}

impl fmt::Display for PersistAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.script)
    }
}
