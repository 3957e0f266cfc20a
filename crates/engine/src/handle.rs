// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle to a scheduled task

use crate::manager::Shared;
use std::sync::Arc;
use yard_core::{Task, TaskKey, TaskReport};

/// Reference to one scheduled task
///
/// Returned by `schedule()` and passed to the action on every run. The
/// handle stays valid after the task is reaped; it just stops seeing it.
#[derive(Clone)]
pub struct TaskHandle {
    key: TaskKey,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle").field("key", &self.key).finish()
    }
}

impl TaskHandle {
    pub(crate) fn new(key: TaskKey, shared: Arc<Shared>) -> Self {
        Self { key, shared }
    }

    pub fn key(&self) -> TaskKey {
        self.key
    }

    /// Current state of the task, or `None` once it has been reaped
    pub fn snapshot(&self) -> Option<Task> {
        self.shared.lock().registry.get(self.key).cloned()
    }

    /// Update the status text, then yield briefly so observers can render it
    pub async fn set_status(&self, status: impl Into<String>) {
        self.shared.report(self.key, TaskReport::Status(status.into()));
        tokio::time::sleep(self.shared.status_pause).await;
    }

    /// Update progress: negative means indeterminate, otherwise `0..=1`
    pub fn set_progress(&self, progress: f64) {
        self.shared.report(self.key, TaskReport::Progress(progress));
    }
}
