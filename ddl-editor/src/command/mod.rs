// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Structural commands, reflectors and the command context

pub mod action;
pub mod commit;
pub mod context;
pub mod progress;
pub mod reflector;
pub mod structural;
pub mod tracker;

pub use action::PersistAction;
pub use commit::{
    execute_plan, ActionExecutor, CommandBatch, CommitOutcome, CommitPlan, ExecutionFailure,
    ScriptCollector,
};
pub use context::{CommandContext, UserParams};
pub use progress::ProgressMonitor;
pub use reflector::{
    CommandReflector, CreateObjectReflector, DeleteObjectReflector, PropertyChangeReflector,
    RenameObjectReflector,
};
pub use structural::{CommandId, CommandKind, StructuralCommand};
pub use tracker::{PropertyChange, PropertyChanges};
