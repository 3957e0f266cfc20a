// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task state machine
//!
//! A task is one schedulable, possibly repeating unit of asynchronous work.
//! This module holds the observable record and the pure transitions applied
//! to it. The action itself lives with the runtime that executes it.

use crate::clock::Clock;
use crate::effect::{Effect, Event};
use crate::error::TaskError;
use crate::notify::Notification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Status shown while a run is in flight
pub const STATUS_RUNNING: &str = "Running";
/// Status after a run ended in cancellation
pub const STATUS_CANCELLED: &str = "Cancelled";
/// Progress value meaning "no measurable progress"
pub const PROGRESS_INDETERMINATE: f64 = -1.0;
/// Label used when a task has neither a name nor an id
pub const ANONYMOUS_LABEL: &str = "(anonymous task)";

/// Registry-assigned identity of a scheduled task
///
/// Unlike the caller-supplied `id`, which may be empty or shared, a key is
/// unique for every scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey(pub u64);

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Total number of runs a task may start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxIterations {
    Limited(u64),
    Unbounded,
}

impl MaxIterations {
    /// True if another run may start after `iteration` runs
    pub fn allows(&self, iteration: u64) -> bool {
        match self {
            MaxIterations::Limited(max) => iteration < *max,
            MaxIterations::Unbounded => true,
        }
    }

    /// Budget with one extra run
    pub fn one_more(self) -> Self {
        match self {
            MaxIterations::Limited(max) => MaxIterations::Limited(max.saturating_add(1)),
            MaxIterations::Unbounded => MaxIterations::Unbounded,
        }
    }
}

impl Default for MaxIterations {
    fn default() -> Self {
        MaxIterations::Limited(1)
    }
}

impl From<u64> for MaxIterations {
    fn from(max: u64) -> Self {
        MaxIterations::Limited(max)
    }
}

/// Caller-supplied configuration captured by a builder
///
/// Defaults match a fresh task: anonymous, run once, no delay, no retry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskConfig {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub delay: Duration,
    pub max_iterations: MaxIterations,
    pub retry_on_fail: bool,
    pub dependencies: Vec<String>,
    pub tags: BTreeMap<String, serde_json::Value>,
}

/// Events that change task state, raised by the runtime
#[derive(Clone, Debug, PartialEq)]
pub enum TaskEvent {
    /// Begin a run
    Start,
    /// The action resolved
    Succeeded,
    /// The action failed
    Failed { message: String },
    /// The action signalled cancellation
    Cancelled,
}

impl TaskEvent {
    /// Map an action result onto the event that ends the run
    pub fn finished(result: Result<(), TaskError>) -> Self {
        match result {
            Ok(()) => TaskEvent::Succeeded,
            Err(TaskError::Cancelled) => TaskEvent::Cancelled,
            Err(TaskError::Failed(message)) => TaskEvent::Failed { message },
        }
    }
}

/// Reports raised by the action itself while it runs
#[derive(Clone, Debug, PartialEq)]
pub enum TaskReport {
    Status(String),
    Progress(f64),
}

/// A task and its runtime state
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub key: TaskKey,
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub status: String,
    /// Minimum spacing between the end of one run and the start of the next
    pub delay: Duration,
    pub max_iterations: MaxIterations,
    /// Runs started so far
    pub iteration: u64,
    /// A failed run grants one extra iteration
    pub retry_on_fail: bool,
    /// Task ids or group ids that must be completed first
    pub dependencies: Vec<String>,
    pub tags: BTreeMap<String, serde_json::Value>,
    pub running: bool,
    /// When the last run started or ended; `None` until the first start
    pub last_run: Option<Instant>,
    pub last_run_failed: bool,
    /// `-1` while indeterminate, else within `0..=1`
    pub progress: f64,
}

impl Task {
    /// Create an idle task from its configuration
    pub fn new(key: TaskKey, config: TaskConfig) -> Self {
        Task {
            key,
            id: config.id,
            group_id: config.group_id,
            name: config.name,
            status: String::new(),
            delay: config.delay,
            max_iterations: config.max_iterations,
            iteration: 0,
            retry_on_fail: config.retry_on_fail,
            dependencies: config.dependencies,
            tags: config.tags,
            running: false,
            last_run: None,
            last_run_failed: false,
            progress: PROGRESS_INDETERMINATE,
        }
    }

    /// Name, else id, else a placeholder
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.id.is_empty() {
            &self.id
        } else {
            ANONYMOUS_LABEL
        }
    }

    /// Not running and no runs remain
    pub fn is_complete(&self) -> bool {
        !self.running && !self.max_iterations.allows(self.iteration)
    }

    /// Delay that must pass since the last run, with the failure floor applied
    pub fn effective_delay(&self, failure_backoff: Duration) -> Duration {
        if self.last_run_failed {
            self.delay.max(failure_backoff)
        } else {
            self.delay
        }
    }

    /// Ids this task contributes to the completion log on success
    fn completion_ids(&self) -> Vec<String> {
        [&self.id, &self.group_id]
            .into_iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect()
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(&self, event: TaskEvent, clock: &impl Clock) -> (Task, Vec<Effect>) {
        let now = clock.now();

        match (self.running, event) {
            // Idle → Running
            (false, TaskEvent::Start) if self.max_iterations.allows(self.iteration) => {
                let task = Task {
                    running: true,
                    last_run: Some(now),
                    iteration: self.iteration + 1,
                    status: STATUS_RUNNING.to_string(),
                    last_run_failed: false,
                    ..self.clone()
                };
                let effects = vec![Effect::Emit(Event::TaskStarted {
                    key: self.key,
                    label: self.label().to_string(),
                    iteration: task.iteration,
                })];
                (task, effects)
            }

            // Running → Idle | Complete
            (true, TaskEvent::Succeeded) => {
                let task = Task {
                    running: false,
                    last_run: Some(now),
                    ..self.clone()
                };
                let label = self.label().to_string();
                let effects = vec![
                    Effect::RecordCompletion {
                        ids: self.completion_ids(),
                    },
                    Effect::Notify(Notification::success(format!("{} completed", label))),
                    Effect::Emit(Event::TaskSucceeded {
                        key: self.key,
                        label,
                    }),
                ];
                (task, effects)
            }

            (true, TaskEvent::Failed { message }) => {
                let max_iterations = if self.retry_on_fail {
                    self.max_iterations.one_more()
                } else {
                    self.max_iterations
                };
                let task = Task {
                    running: false,
                    last_run: Some(now),
                    last_run_failed: true,
                    status: format!("Error: {}", message),
                    max_iterations,
                    ..self.clone()
                };
                let label = self.label().to_string();
                let effects = vec![
                    Effect::Notify(Notification::error(format!(
                        "{} failed: {}",
                        label, message
                    ))),
                    Effect::Emit(Event::TaskFailed {
                        key: self.key,
                        label,
                        message,
                        retrying: self.retry_on_fail,
                    }),
                ];
                (task, effects)
            }

            (true, TaskEvent::Cancelled) => {
                let task = Task {
                    running: false,
                    last_run: Some(now),
                    last_run_failed: false,
                    status: STATUS_CANCELLED.to_string(),
                    ..self.clone()
                };
                let effects = vec![Effect::Emit(Event::TaskCancelled {
                    key: self.key,
                    label: self.label().to_string(),
                })];
                (task, effects)
            }

            // Double start, finishing an idle task, starting an exhausted one
            _ => (self.clone(), vec![]),
        }
    }

    /// Apply a status or progress report from the running action
    pub fn report(&self, report: TaskReport) -> (Task, Vec<Effect>) {
        match report {
            TaskReport::Status(status) => {
                let task = Task {
                    status: status.clone(),
                    ..self.clone()
                };
                let effects = vec![Effect::Emit(Event::TaskStatus {
                    key: self.key,
                    status,
                })];
                (task, effects)
            }
            TaskReport::Progress(value) => {
                let progress = normalize_progress(value);
                let task = Task {
                    progress,
                    ..self.clone()
                };
                let effects = vec![Effect::Emit(Event::TaskProgress {
                    key: self.key,
                    progress,
                })];
                (task, effects)
            }
        }
    }
}

/// Negative (or NaN) means indeterminate; anything else is capped to 1
fn normalize_progress(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        PROGRESS_INDETERMINATE
    } else {
        value.min(1.0)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
