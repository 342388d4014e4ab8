// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers

use colored::Colorize;
use std::path::{Path, PathBuf};

use super::commands::OutputFormat;
use super::output::PlanFormatter;
use super::script::{EditScript, ScriptSession};
use ddl_editor::{CommitOutcome, EditorConfig, ProgressMonitor, ScriptCollector};

/// Result of running one edit script
#[derive(Debug)]
pub struct RunReport {
    /// Formatted plan
    pub output: String,
    /// Execution outcome; `None` for a dry run
    pub outcome: Option<CommitOutcome>,
}

/// Handle the run command
///
/// Loads the script's model, applies its edits and prints the generated plan.
/// Without `dry_run` the plan is also committed into a script collector so
/// the model reflects the executed commands.
pub fn handle_run(
    script_path: PathBuf,
    format: OutputFormat,
    config_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = run_script(&script_path, format, config_path.as_deref(), dry_run)?;
    print!("{}", report.output);

    if let Some(outcome) = &report.outcome {
        if format != OutputFormat::Json {
            eprintln!(
                "{}",
                format!(
                    "Applied {} command(s), {} action(s)",
                    outcome.applied.len(),
                    outcome.executed_actions
                )
                .green()
            );
        }
    }
    Ok(())
}

/// Run a script and return the formatted plan without printing it
pub fn run_script(
    script_path: &Path,
    format: OutputFormat,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::default(),
    };

    let script = EditScript::from_file(script_path)?;
    let mut session = ScriptSession::load(&script.model, config)?;
    session.apply(&script.edits)?;

    let progress = ProgressMonitor::new();
    let plan = session
        .context
        .prepare_commit(&session.model, &progress)?;
    let output = PlanFormatter::format(&plan, &session.config, format);

    if dry_run {
        session.context.abort_commit();
        log::info!("Dry run: {} action(s) not applied", plan.action_count());
        return Ok(RunReport {
            output,
            outcome: None,
        });
    }

    let mut collector = ScriptCollector::new();
    let outcome = ddl_editor::execute_plan(&plan, &mut collector, &progress);
    session.context.finish_commit(&mut session.model, &outcome)?;

    Ok(RunReport {
        output,
        outcome: Some(outcome),
    })
}
