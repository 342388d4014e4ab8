// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! DDL Editor CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "DDL Editor".bold().green(), ddl_editor::VERSION);
            println!("Structural object editing and DDL generation");
            Ok(())
        }

        Commands::Run {
            script,
            format,
            config,
            dry_run,
        } => cli::handle_run(script, format, config, dry_run),
    }
}
