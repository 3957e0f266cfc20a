// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events produced by task transitions

use crate::notify::Notification;
use crate::task::TaskKey;

/// Side effects a transition asks its owner to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit an event for observers and logs
    Emit(Event),
    /// Append ids (task id and/or group id) to the completion log
    RecordCompletion { ids: Vec<String> },
    /// Surface a notification to the user
    Notify(Notification),
}

/// Events describing observable task changes
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TaskScheduled {
        key: TaskKey,
        label: String,
    },
    TaskStarted {
        key: TaskKey,
        label: String,
        iteration: u64,
    },
    TaskSucceeded {
        key: TaskKey,
        label: String,
    },
    TaskFailed {
        key: TaskKey,
        label: String,
        message: String,
        retrying: bool,
    },
    TaskCancelled {
        key: TaskKey,
        label: String,
    },
    TaskStatus {
        key: TaskKey,
        status: String,
    },
    TaskProgress {
        key: TaskKey,
        progress: f64,
    },
    TaskReaped {
        key: TaskKey,
        label: String,
    },
}

impl Event {
    /// Event name used in logs, e.g. `task:started`
    pub fn name(&self) -> &'static str {
        match self {
            Event::TaskScheduled { .. } => "task:scheduled",
            Event::TaskStarted { .. } => "task:started",
            Event::TaskSucceeded { .. } => "task:succeeded",
            Event::TaskFailed { .. } => "task:failed",
            Event::TaskCancelled { .. } => "task:cancelled",
            Event::TaskStatus { .. } => "task:status",
            Event::TaskProgress { .. } => "task:progress",
            Event::TaskReaped { .. } => "task:reaped",
        }
    }

    pub fn key(&self) -> TaskKey {
        match self {
            Event::TaskScheduled { key, .. }
            | Event::TaskStarted { key, .. }
            | Event::TaskSucceeded { key, .. }
            | Event::TaskFailed { key, .. }
            | Event::TaskCancelled { key, .. }
            | Event::TaskStatus { key, .. }
            | Event::TaskProgress { key, .. }
            | Event::TaskReaped { key, .. } => *key,
        }
    }
}
