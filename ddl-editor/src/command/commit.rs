// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Commit plans and action execution
//!
//! Committing is split so that only owned data crosses threads: the command
//! context produces a [`CommitPlan`], [`execute_plan`] drives it through an
//! [`ActionExecutor`] (possibly on a worker thread) and returns a
//! [`CommitOutcome`], and the owner of the context applies the outcome to the
//! model.

use super::action::PersistAction;
use super::progress::ProgressMonitor;
use super::structural::CommandId;
use crate::config::EditorConfig;
use serde::Serialize;
use thiserror::Error;

/// Actions generated for one top-level command, together with the nested
/// child commands whose declarations were inlined into them.
#[derive(Debug, Clone, Serialize)]
pub struct CommandBatch {
    title: String,
    commands: Vec<CommandId>,
    actions: Vec<PersistAction>,
}

impl CommandBatch {
    pub fn new(title: &str, commands: Vec<CommandId>, actions: Vec<PersistAction>) -> Self {
        Self {
            title: title.to_string(),
            commands,
            actions,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Owning command first, absorbed children after it
    pub fn commands(&self) -> &[CommandId] {
        &self.commands
    }

    pub fn actions(&self) -> &[PersistAction] {
        &self.actions
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitPlan {
    batches: Vec<CommandBatch>,
}

impl CommitPlan {
    pub fn new(batches: Vec<CommandBatch>) -> Self {
        Self { batches }
    }

    pub fn batches(&self) -> &[CommandBatch] {
        &self.batches
    }

    /// All actions in execution order
    pub fn actions(&self) -> impl Iterator<Item = &PersistAction> {
        self.batches.iter().flat_map(|b| b.actions.iter())
    }

    pub fn action_count(&self) -> usize {
        self.batches.iter().map(|b| b.actions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }

    /// Render the plan as one delimited script
    pub fn script(&self, config: &EditorConfig) -> String {
        render_script(self.actions(), config)
    }
}

pub(crate) fn render_script<'a>(
    actions: impl Iterator<Item = &'a PersistAction>,
    config: &EditorConfig,
) -> String {
    actions
        .map(|a| format!("{}{}", a.script(), config.statement_delimiter))
        .collect::<Vec<_>>()
        .join(&config.line_separator)
}

/// External collaborator that runs DDL against a live connection
pub trait ActionExecutor {
    fn execute(&mut self, action: &PersistAction) -> Result<(), String>;
}

impl<F> ActionExecutor for F
where
    F: FnMut(&PersistAction) -> Result<(), String>,
{
    fn execute(&mut self, action: &PersistAction) -> Result<(), String> {
        self(action)
    }
}

/// Executor that only records what it is given. Used for dry runs.
#[derive(Debug, Default)]
pub struct ScriptCollector {
    actions: Vec<PersistAction>,
}

impl ScriptCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[PersistAction] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<PersistAction> {
        self.actions
    }

    pub fn script(&self, config: &EditorConfig) -> String {
        render_script(self.actions.iter(), config)
    }
}

impl ActionExecutor for ScriptCollector {
    fn execute(&mut self, action: &PersistAction) -> Result<(), String> {
        self.actions.push(action.clone());
        Ok(())
    }
}

/// Which action failed, and why
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{action_title} (action {action_index} of '{command_title}'): {reason}")]
pub struct ExecutionFailure {
    pub command_title: String,
    pub action_index: usize,
    pub action_title: String,
    pub script: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommitOutcome {
    /// Commands whose batches executed completely, in order
    pub applied: Vec<CommandId>,
    pub executed_actions: usize,
    pub failure: Option<ExecutionFailure>,
    pub cancelled: bool,
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.cancelled
    }
}

/// Submit a plan's actions in order.
///
/// Stops at the first failure, and before the next action once cancellation
/// is observed. A batch counts as applied only when all its actions ran.
pub fn execute_plan(
    plan: &CommitPlan,
    executor: &mut dyn ActionExecutor,
    progress: &ProgressMonitor,
) -> CommitOutcome {
    let mut outcome = CommitOutcome::default();

    for batch in plan.batches() {
        progress.sub_task(batch.title());
        for (index, action) in batch.actions().iter().enumerate() {
            if progress.is_cancelled() {
                log::warn!(
                    "Commit cancelled after {} action(s)",
                    outcome.executed_actions
                );
                outcome.cancelled = true;
                return outcome;
            }

            log::debug!("Executing '{}': {}", action.title(), action.script());
            if let Err(reason) = executor.execute(action) {
                log::warn!("Action '{}' failed: {}", action.title(), reason);
                outcome.failure = Some(ExecutionFailure {
                    command_title: batch.title().to_string(),
                    action_index: index,
                    action_title: action.title().to_string(),
                    script: action.script().to_string(),
                    reason,
                });
                return outcome;
            }
            outcome.executed_actions += 1;
        }

        outcome.applied.extend(batch.commands().iter().copied());
    }

    outcome
}
