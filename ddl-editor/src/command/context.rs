// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command context: the pending unit of work of one edit session
//!
//! The context keeps commands in registration order, each paired with the
//! reflector that mirrors it onto the model. Commands registered with
//! `execute_immediately` are reflected at once so the live tree shows the
//! edit before anything is committed.
//!
//! Undo walks a history of steps. Besides registered commands it holds the
//! edits merged into an older composite command after other commands were
//! registered; those are reverted on their own so the model is always
//! unwound in the order it was changed.
//!
//! A context has a single owner. Once [`CommandContext::prepare_commit`] has
//! handed out a plan, further edits are refused until the commit is finished
//! or aborted.

use super::commit::{execute_plan, ActionExecutor, CommandBatch, CommitOutcome, CommitPlan};
use super::progress::ProgressMonitor;
use super::reflector::{reflect_property, CommandReflector};
use super::structural::{CommandId, CommandKind, StructuralCommand};
use super::tracker::PropertyChange;
use crate::editor::persist::PersistContext;
use crate::error::{EditorError, EditorResult};
use crate::model::{ObjectGraph, ObjectId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct CommandEntry {
    command: StructuralCommand,
    reflector: Arc<dyn CommandReflector>,
    execute_immediately: bool,
    reflected: bool,
}

/// Property edit merged into a command that was no longer the newest
struct MergedEdit {
    command: CommandId,
    property: String,
    before: Value,
    after: Value,
    /// Delta the command tracked for `property` before the edit
    previous: Option<PropertyChange>,
}

enum HistoryStep {
    Command(CommandId),
    Merge(MergedEdit),
}

impl HistoryStep {
    fn command(&self) -> CommandId {
        match self {
            HistoryStep::Command(id) => *id,
            HistoryStep::Merge(edit) => edit.command,
        }
    }
}

enum UndoneStep {
    Command(CommandEntry),
    Merge(MergedEdit),
}

/// Side table of the context.
///
/// Maps objects to the composite command collecting their edits, so that a
/// later edit of a not-yet-persisted object extends its create command and
/// repeated edits of a persisted object merge into one change command. Also
/// carries free-form values for callers.
#[derive(Debug, Default)]
pub struct UserParams {
    pending_creates: HashMap<ObjectId, CommandId>,
    pending_changes: HashMap<ObjectId, CommandId>,
    values: HashMap<String, Value>,
}

impl UserParams {
    pub fn pending_create(&self, object: ObjectId) -> Option<CommandId> {
        self.pending_creates.get(&object).copied()
    }

    pub fn set_pending_create(&mut self, object: ObjectId, command: CommandId) {
        self.pending_creates.insert(object, command);
    }

    pub fn pending_change(&self, object: ObjectId) -> Option<CommandId> {
        self.pending_changes.get(&object).copied()
    }

    pub fn set_pending_change(&mut self, object: ObjectId, command: CommandId) {
        self.pending_changes.insert(object, command);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.values.insert(key.to_string(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    fn forget_command(&mut self, command: CommandId) {
        self.pending_creates.retain(|_, c| *c != command);
        self.pending_changes.retain(|_, c| *c != command);
    }

    fn remember_command(&mut self, command: &StructuralCommand) {
        match command.kind() {
            CommandKind::Create => self.set_pending_create(command.target(), command.id()),
            CommandKind::Change => {
                self.pending_changes
                    .entry(command.target())
                    .or_insert(command.id());
            }
            _ => {}
        }
    }

    fn clear(&mut self) {
        self.pending_creates.clear();
        self.pending_changes.clear();
        self.values.clear();
    }
}

#[derive(Default)]
pub struct CommandContext {
    entries: Vec<CommandEntry>,
    history: Vec<HistoryStep>,
    undone: Vec<UndoneStep>,
    user_params: UserParams,
    committing: bool,
}

impl CommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_editable(&self) -> EditorResult<()> {
        if self.committing {
            return Err(EditorError::InvalidOperation(
                "commit in progress; the command context cannot be edited".to_string(),
            ));
        }
        Ok(())
    }

    fn entry_mut(&mut self, command: CommandId) -> EditorResult<&mut CommandEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.command.id() == command)
            .ok_or_else(|| {
                EditorError::InvalidOperation(format!("command {} is not pending", command))
            })
    }

    /// Append a command. With `execute_immediately` the reflector's `redo`
    /// runs before this returns; if it fails the command is not registered.
    pub fn add_command(
        &mut self,
        model: &mut ObjectGraph,
        command: StructuralCommand,
        reflector: Arc<dyn CommandReflector>,
        execute_immediately: bool,
    ) -> EditorResult<CommandId> {
        self.ensure_editable()?;

        if execute_immediately {
            reflector.redo(model, &command)?;
        }
        self.undone.clear();

        let id = command.id();
        log::debug!(
            "Registered {} command '{}' for {} {}",
            command.kind().label(),
            command.title(),
            command.target_kind(),
            command.target()
        );
        self.entries.push(CommandEntry {
            command,
            reflector,
            execute_immediately,
            reflected: execute_immediately,
        });
        self.history.push(HistoryStep::Command(id));
        Ok(id)
    }

    /// Merge one property edit into an existing composite command and
    /// reflect the new value onto the model.
    ///
    /// Unless `command` is the newest step of the history, the edit becomes
    /// a step of its own that undo reverts before anything older.
    pub fn record_property_change(
        &mut self,
        model: &mut ObjectGraph,
        command: CommandId,
        property: &str,
        new_value: Value,
    ) -> EditorResult<()> {
        self.ensure_editable()?;

        let newest = matches!(self.history.last(), Some(HistoryStep::Command(id)) if *id == command);
        let entry = self.entry_mut(command)?;
        if !entry.command.is_composite() {
            return Err(EditorError::InvalidOperation(format!(
                "{} command {} cannot carry property changes",
                entry.command.kind().label(),
                command
            )));
        }

        let target = entry.command.target();
        let current = model.property(target, property)?;
        let previous = entry.command.changes().get(property).cloned();
        reflect_property(model, &entry.command, property, &current, &new_value)?;
        entry
            .command
            .changes_mut()
            .record(property, current.clone(), new_value.clone());

        if !newest {
            self.history.push(HistoryStep::Merge(MergedEdit {
                command,
                property: property.to_string(),
                before: current,
                after: new_value,
                previous,
            }));
        }
        self.undone.clear();
        Ok(())
    }

    pub fn command(&self, id: CommandId) -> Option<&StructuralCommand> {
        self.entries
            .iter()
            .map(|e| &e.command)
            .find(|c| c.id() == id)
    }

    /// Pending commands in registration order
    pub fn commands(&self) -> impl Iterator<Item = &StructuralCommand> {
        self.entries.iter().map(|e| &e.command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn user_params(&self) -> &UserParams {
        &self.user_params
    }

    pub fn user_params_mut(&mut self) -> &mut UserParams {
        &mut self.user_params
    }

    pub fn is_committing(&self) -> bool {
        self.committing
    }

    pub fn can_undo(&self) -> bool {
        !self.committing && !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.committing && !self.undone.is_empty()
    }

    /// Revert the most recent step. Returns false if there is none.
    pub fn undo(&mut self, model: &mut ObjectGraph) -> EditorResult<bool> {
        self.ensure_editable()?;
        let Some(step) = self.history.pop() else {
            return Ok(false);
        };

        match step {
            HistoryStep::Merge(edit) => {
                if let Err(e) = self.revert_merge(model, &edit) {
                    self.history.push(HistoryStep::Merge(edit));
                    return Err(e);
                }
                log::debug!("Undid merged edit of '{}' in {}", edit.property, edit.command);
                self.undone.push(UndoneStep::Merge(edit));
            }
            HistoryStep::Command(id) => {
                let position = self
                    .entries
                    .iter()
                    .position(|e| e.command.id() == id)
                    .ok_or_else(|| {
                        EditorError::InvalidOperation(format!("command {} is not pending", id))
                    })?;
                let entry = self.entries.remove(position);
                if entry.reflected {
                    if let Err(e) = entry.reflector.undo(model, &entry.command) {
                        self.entries.insert(position, entry);
                        self.history.push(HistoryStep::Command(id));
                        return Err(e);
                    }
                }
                self.user_params.forget_command(id);
                log::debug!("Undid '{}' on {}", entry.command.title(), entry.command.target());
                self.undone.push(UndoneStep::Command(entry));
            }
        }
        Ok(true)
    }

    /// Re-apply the most recently undone step. Returns false if there is none.
    pub fn redo(&mut self, model: &mut ObjectGraph) -> EditorResult<bool> {
        self.ensure_editable()?;
        let Some(step) = self.undone.pop() else {
            return Ok(false);
        };

        match step {
            UndoneStep::Merge(edit) => {
                if let Err(e) = self.reapply_merge(model, &edit) {
                    self.undone.push(UndoneStep::Merge(edit));
                    return Err(e);
                }
                log::debug!("Redid merged edit of '{}' in {}", edit.property, edit.command);
                self.history.push(HistoryStep::Merge(edit));
            }
            UndoneStep::Command(entry) => {
                if entry.execute_immediately {
                    if let Err(e) = entry.reflector.redo(model, &entry.command) {
                        self.undone.push(UndoneStep::Command(entry));
                        return Err(e);
                    }
                }
                self.user_params.remember_command(&entry.command);
                log::debug!("Redid '{}' on {}", entry.command.title(), entry.command.target());
                self.history.push(HistoryStep::Command(entry.command.id()));
                self.entries.push(entry);
            }
        }
        Ok(true)
    }

    fn revert_merge(&mut self, model: &mut ObjectGraph, edit: &MergedEdit) -> EditorResult<()> {
        let entry = self.entry_mut(edit.command)?;
        reflect_property(model, &entry.command, &edit.property, &edit.after, &edit.before)?;
        entry
            .command
            .changes_mut()
            .restore(&edit.property, edit.previous.clone());
        Ok(())
    }

    fn reapply_merge(&mut self, model: &mut ObjectGraph, edit: &MergedEdit) -> EditorResult<()> {
        let entry = self.entry_mut(edit.command)?;
        reflect_property(model, &entry.command, &edit.property, &edit.before, &edit.after)?;
        entry
            .command
            .changes_mut()
            .record(&edit.property, edit.before.clone(), edit.after.clone());
        Ok(())
    }

    /// Undo `command` and every step after it, leaving nothing to redo.
    ///
    /// Registering a command empties the redo stack, so this only drops
    /// steps taken since `command` was added.
    pub(crate) fn discard_since(
        &mut self,
        model: &mut ObjectGraph,
        command: CommandId,
    ) -> EditorResult<()> {
        while self.command(command).is_some() {
            if !self.undo(model)? {
                break;
            }
        }
        self.undone.clear();
        Ok(())
    }

    /// Abandon the session: undo every pending command, newest first
    pub fn rollback(&mut self, model: &mut ObjectGraph) -> EditorResult<()> {
        while self.undo(model)? {}
        self.undone.clear();
        self.history.clear();
        self.user_params.clear();
        Ok(())
    }

    /// Validate every pending command, then generate the DDL plan.
    ///
    /// Validation of all commands completes before any action is generated;
    /// a validation failure leaves the context untouched. On success the
    /// context is locked until [`finish_commit`](Self::finish_commit) or
    /// [`abort_commit`](Self::abort_commit).
    pub fn prepare_commit(
        &mut self,
        model: &ObjectGraph,
        progress: &ProgressMonitor,
    ) -> EditorResult<CommitPlan> {
        self.ensure_editable()?;

        progress.sub_task("Validate changes");
        for entry in &self.entries {
            entry.command.validate(model, progress)?;
        }

        progress.sub_task("Generate DDL");
        let mut absorbed: HashSet<CommandId> = HashSet::new();
        let mut batches = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            progress.check()?;
            let command = &entry.command;
            if absorbed.contains(&command.id()) {
                continue;
            }

            let nested: Vec<&StructuralCommand> = match command.kind() {
                CommandKind::Create => self.entries[index + 1..]
                    .iter()
                    .map(|e| &e.command)
                    .filter(|c| c.is_composite() && !absorbed.contains(&c.id()))
                    .filter(|c| {
                        model.object(c.target()).and_then(|o| o.container())
                            == Some(command.target())
                    })
                    .collect(),
                _ => Vec::new(),
            };

            let names = names_before_renames(&self.entries[index + 1..]);
            let mut cx = PersistContext::new(model, nested).with_names(names);
            let actions = command.persist_actions(&mut cx)?;

            let mut members = vec![command.id()];
            for child in cx.into_absorbed() {
                absorbed.insert(child);
                members.push(child);
            }
            batches.push(CommandBatch::new(command.title(), members, actions));
        }

        let plan = CommitPlan::new(batches);
        self.committing = true;
        log::info!(
            "Prepared commit of {} command(s): {} action(s)",
            self.entries.len(),
            plan.action_count()
        );
        Ok(plan)
    }

    /// Release the commit lock without applying anything
    pub fn abort_commit(&mut self) {
        self.committing = false;
    }

    /// Apply a commit outcome: reflect and finalize every command whose
    /// batch executed, and drop it from the context. Commands that did not
    /// execute stay pending.
    ///
    /// Executed commands leave the context even when applying one of them to
    /// the model fails; the first such error is returned once all are done.
    pub fn finish_commit(
        &mut self,
        model: &mut ObjectGraph,
        outcome: &CommitOutcome,
    ) -> EditorResult<()> {
        if !self.committing {
            return Err(EditorError::InvalidOperation(
                "no commit in progress".to_string(),
            ));
        }
        self.committing = false;

        let mut first_error = None;
        for id in &outcome.applied {
            let Some(position) = self.entries.iter().position(|e| e.command.id() == *id) else {
                continue;
            };
            let entry = self.entries.remove(position);
            let reflected = if entry.reflected {
                Ok(())
            } else {
                entry.reflector.redo(model, &entry.command)
            };
            if let Err(e) = reflected.and_then(|()| entry.command.update_model(model)) {
                log::warn!(
                    "Could not apply committed '{}' to the model: {}",
                    entry.command.title(),
                    e
                );
                first_error.get_or_insert(e);
            }
            self.user_params.forget_command(*id);
        }
        let applied: HashSet<CommandId> = outcome.applied.iter().copied().collect();
        self.history.retain(|step| !applied.contains(&step.command()));
        self.undone.clear();

        log::info!(
            "Commit applied {} command(s), {} still pending",
            outcome.applied.len(),
            self.entries.len()
        );
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Prepare, execute and apply in one call on the current thread.
    ///
    /// Commands executed before a failure are applied and removed; the
    /// failure is returned as `EditorError::Execution`.
    pub fn commit(
        &mut self,
        model: &mut ObjectGraph,
        executor: &mut dyn ActionExecutor,
        progress: &ProgressMonitor,
    ) -> EditorResult<CommitOutcome> {
        let plan = self.prepare_commit(model, progress)?;
        let outcome = execute_plan(&plan, executor, progress);
        self.finish_commit(model, &outcome)?;

        if let Some(failure) = &outcome.failure {
            return Err(EditorError::Execution(failure.clone()));
        }
        if outcome.cancelled {
            return Err(EditorError::Cancelled);
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("commands", &self.entries.iter().map(|e| &e.command).collect::<Vec<_>>())
            .field("history", &self.history.len())
            .field("undone", &self.undone.len())
            .field("user_params", &self.user_params)
            .field("committing", &self.committing)
            .finish()
    }
}

/// Names that renames registered later replace: each renamed object maps to
/// the name it had before the first of them.
fn names_before_renames(later: &[CommandEntry]) -> HashMap<ObjectId, &str> {
    let mut names = HashMap::new();
    for entry in later {
        if let CommandKind::Rename { old_name, .. } = entry.command.kind() {
            names
                .entry(entry.command.target())
                .or_insert(old_name.as_str());
        }
    }
    names
}
