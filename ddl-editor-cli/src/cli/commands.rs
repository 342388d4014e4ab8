// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ddl-editor")]
#[command(about = "Apply structural edits to a database model and print the generated DDL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply an edit script and print the resulting DDL
    Run {
        /// Edit script (JSON)
        script: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Sql)]
        format: OutputFormat,

        /// Editor configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only print the plan; do not apply it to the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited SQL script
    Sql,
    /// Table of actions
    Table,
    /// JSON plan
    Json,
}
