// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for DDL Editor
//!
//! Runs edit scripts against an in-memory model and prints the DDL the
//! edits generate.

pub mod commands;
pub mod output;
pub mod runner;
pub mod script;

pub use commands::{Cli, Commands};
pub use runner::handle_run;
