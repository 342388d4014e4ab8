// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Cooperative cancellation for long-running validation and commit work

use crate::error::{EditorError, EditorResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress signal threaded through validation, DDL generation and execution.
///
/// Clones share one cancellation flag, so the owner thread can keep a clone
/// and cancel a commit running on a worker.
#[derive(Debug, Clone, Default)]
pub struct ProgressMonitor {
    cancelled: Arc<AtomicBool>,
}

impl ProgressMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` once cancellation has been requested
    pub fn check(&self) -> EditorResult<()> {
        if self.is_cancelled() {
            return Err(EditorError::Cancelled);
        }
        Ok(())
    }

    pub fn sub_task(&self, name: &str) {
        log::debug!("{}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_cancellation() {
        let monitor = ProgressMonitor::new();
        let worker = monitor.clone();
        assert!(worker.check().is_ok());

        monitor.cancel();
        assert!(worker.is_cancelled());
        assert!(matches!(worker.check(), Err(EditorError::Cancelled)));
    }
}
