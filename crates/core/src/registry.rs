// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task registry: start eligibility, completion tracking, and reaping
//!
//! The registry owns every registered task plus the completion log. It makes
//! all scheduling decisions synchronously; running the actions is left to
//! the caller.

use crate::clock::Clock;
use crate::effect::{Effect, Event};
use crate::task::{Task, TaskConfig, TaskEvent, TaskKey, TaskReport};
use std::time::{Duration, Instant};

/// Default floor on the delay after a failed run
pub const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(5);
/// Default retention of a task whose last run succeeded
pub const DEFAULT_COMPLETED_RETENTION: Duration = Duration::ZERO;
/// Default retention of a task whose last run failed
pub const DEFAULT_FAILED_RETENTION: Duration = Duration::from_secs(15);

/// Timing policy applied to every task in a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub failure_backoff: Duration,
    pub completed_retention: Duration,
    pub failed_retention: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            completed_retention: DEFAULT_COMPLETED_RETENTION,
            failed_retention: DEFAULT_FAILED_RETENTION,
        }
    }
}

impl SchedulePolicy {
    /// How long a complete task stays visible after its last run
    pub fn retention(&self, task: &Task) -> Duration {
        if task.last_run_failed {
            self.failed_retention
        } else {
            self.completed_retention
        }
    }

    fn is_expired(&self, task: &Task, now: Instant) -> bool {
        if !task.is_complete() {
            return false;
        }
        match task.last_run {
            Some(last_run) => last_run + self.retention(task) <= now,
            None => true,
        }
    }
}

/// Why a task may not start right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    /// A run is already in flight
    Running,
    /// No iterations remain
    Exhausted,
    /// Delay (or failure back-off) has not elapsed
    Waiting { remaining: Duration },
    /// The global ceiling is reached
    AtCapacity { running: usize },
    /// A dependency is not completed
    Dependency { id: String },
}

/// Owner of the task set and the completion log
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    completed: Vec<String>,
    max_parallel: usize,
    policy: SchedulePolicy,
    next_key: u64,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(SchedulePolicy::default(), 1)
    }
}

impl TaskRegistry {
    pub fn new(policy: SchedulePolicy, max_parallel: usize) -> Self {
        Self {
            tasks: Vec::new(),
            completed: Vec::new(),
            max_parallel,
            policy,
            next_key: 1,
        }
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.policy
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    pub fn set_max_parallel(&mut self, max_parallel: usize) {
        self.max_parallel = max_parallel;
    }

    /// Register a new task; it is visible to scheduling and dependents at once
    pub fn register(&mut self, config: TaskConfig) -> (TaskKey, Vec<Effect>) {
        let key = TaskKey(self.next_key);
        self.next_key += 1;

        let task = Task::new(key, config);
        let effects = vec![Effect::Emit(Event::TaskScheduled {
            key,
            label: task.label().to_string(),
        })];
        self.tasks.push(task);
        (key, effects)
    }

    pub fn get(&self, key: TaskKey) -> Option<&Task> {
        self.tasks.iter().find(|t| t.key == key)
    }

    /// Registered tasks in registration order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks waiting for a future run
    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.is_complete() && !t.running)
    }

    /// Tasks with a run in flight
    pub fn active(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.running)
    }

    pub fn running_count(&self) -> usize {
        self.active().count()
    }

    pub fn completed_ids(&self) -> &[String] {
        &self.completed
    }

    /// True once `id` succeeded and no task of that group is still incomplete
    ///
    /// Empty ids are never logged, so `""` is never completed.
    pub fn is_completed(&self, id: &str) -> bool {
        if !self.completed.iter().any(|c| c == id) {
            return false;
        }
        !self
            .tasks
            .iter()
            .any(|t| t.group_id == id && !t.is_complete())
    }

    /// Evaluate the start conditions for `task`, in order
    pub fn check(&self, task: &Task, now: Instant) -> Result<(), Blocked> {
        if task.running {
            return Err(Blocked::Running);
        }

        if !task.max_iterations.allows(task.iteration) {
            return Err(Blocked::Exhausted);
        }

        if let Some(last_run) = task.last_run {
            let wait = task.effective_delay(self.policy.failure_backoff);
            let elapsed = now.saturating_duration_since(last_run);
            if elapsed < wait {
                return Err(Blocked::Waiting {
                    remaining: wait - elapsed,
                });
            }
        }

        let running = self.running_count();
        if running >= self.max_parallel {
            return Err(Blocked::AtCapacity { running });
        }

        if let Some(id) = task.dependencies.iter().find(|d| !self.is_completed(d)) {
            return Err(Blocked::Dependency { id: id.clone() });
        }

        Ok(())
    }

    /// Start pass: start every eligible task in registration order
    ///
    /// Tasks started earlier in the pass count against the ceiling for later
    /// ones.
    pub fn start_ready(&mut self, clock: &impl Clock) -> (Vec<TaskKey>, Vec<Effect>) {
        let now = clock.now();
        let mut started = Vec::new();
        let mut effects = Vec::new();

        for index in 0..self.tasks.len() {
            match self.check(&self.tasks[index], now) {
                Ok(()) => {
                    let (task, task_effects) = self.tasks[index].transition(TaskEvent::Start, clock);
                    started.push(task.key);
                    self.tasks[index] = task;
                    effects.extend(task_effects);
                }
                Err(reason) => {
                    tracing::trace!(task = %self.tasks[index].key, ?reason, "not started");
                }
            }
        }

        (started, effects)
    }

    /// Apply a runtime event to a task
    ///
    /// Completion-log effects are applied here; the rest are returned.
    pub fn apply(&mut self, key: TaskKey, event: TaskEvent, clock: &impl Clock) -> Vec<Effect> {
        let Some(index) = self.index_of(key) else {
            return vec![];
        };
        let (task, effects) = self.tasks[index].transition(event, clock);
        self.tasks[index] = task;
        self.absorb(effects)
    }

    /// Apply a report from a running action
    pub fn report(&mut self, key: TaskKey, report: TaskReport) -> Vec<Effect> {
        let Some(index) = self.index_of(key) else {
            return vec![];
        };
        let (task, effects) = self.tasks[index].report(report);
        self.tasks[index] = task;
        effects
    }

    /// Reap pass: remove complete tasks whose retention window has passed
    ///
    /// Remaining tasks keep their relative order.
    pub fn reap(&mut self, now: Instant) -> Vec<Task> {
        let policy = self.policy;
        let (reaped, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| policy.is_expired(t, now));
        self.tasks = kept;
        reaped
    }

    fn index_of(&self, key: TaskKey) -> Option<usize> {
        self.tasks.iter().position(|t| t.key == key)
    }

    fn absorb(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut remaining = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::RecordCompletion { ids } => self.completed.extend(ids),
                other => remaining.push(other),
            }
        }
        remaining
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
