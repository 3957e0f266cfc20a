// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task manager: the tick loop and action execution

use crate::action::Action;
use crate::config::ManagerConfig;
use crate::events::{log_event, TasksChanged};
use crate::{TaskBuilder, TaskHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use yard_adapters::NotifyAdapter;
use yard_core::{
    Clock, Effect, Event, Task, TaskConfig, TaskError, TaskEvent, TaskKey, TaskRegistry,
    TaskReport, TracedEffect,
};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// State guarded by the manager's single lock
pub(crate) struct State {
    pub(crate) registry: TaskRegistry,
    actions: HashMap<TaskKey, Action>,
}

/// State shared by the manager and every task handle
pub(crate) struct Shared {
    state: Mutex<State>,
    changes: broadcast::Sender<TasksChanged>,
    pub(crate) status_pause: Duration,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn notify_changed(&self) {
        // No receivers is fine
        let _ = self.changes.send(TasksChanged);
    }

    pub(crate) fn report(&self, key: TaskKey, report: TaskReport) {
        let effects = self.lock().registry.report(key, report);
        log_effects(&effects);
        self.notify_changed();
    }
}

/// Outcome of one scheduling tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub started: Vec<TaskKey>,
    pub reaped: Vec<TaskKey>,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        !self.started.is_empty() || !self.reaped.is_empty()
    }
}

/// Coordinator of scheduled tasks
///
/// A cheap clonable handle; clones share the same task set.
#[derive(Clone)]
pub struct TaskManager<C: Clock, N: NotifyAdapter> {
    shared: Arc<Shared>,
    clock: C,
    notify: N,
    tick_interval: Duration,
}

impl<C, N> TaskManager<C, N>
where
    C: Clock,
    N: NotifyAdapter,
{
    pub fn new(config: &ManagerConfig, clock: C, notify: N) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    registry: TaskRegistry::new(config.policy(), config.max_parallel_tasks),
                    actions: HashMap::new(),
                }),
                changes,
                status_pause: config.status_pause,
            }),
            clock,
            notify,
            tick_interval: config.tick_interval,
        }
    }

    /// Start configuring a new task
    pub fn build(&self) -> TaskBuilder<C, N> {
        TaskBuilder::new(self.clone())
    }

    pub(crate) fn register(&self, config: TaskConfig, action: Option<Action>) -> TaskHandle {
        let key = {
            let mut state = self.shared.lock();
            let (key, effects) = state.registry.register(config);
            if let Some(action) = action {
                state.actions.insert(key, action);
            }
            log_effects(&effects);
            key
        };
        self.shared.notify_changed();
        TaskHandle::new(key, Arc::clone(&self.shared))
    }

    /// True once `id` succeeded and no member of group `id` is incomplete
    ///
    /// An empty id is never completed.
    pub fn is_completed(&self, id: &str) -> bool {
        self.shared.lock().registry.is_completed(id)
    }

    pub fn max_parallel_tasks(&self) -> usize {
        self.shared.lock().registry.max_parallel()
    }

    /// Change the ceiling; takes effect on the next tick
    pub fn set_max_parallel_tasks(&self, max: usize) {
        self.shared.lock().registry.set_max_parallel(max);
    }

    /// Snapshots of every registered task, in registration order
    pub fn tasks(&self) -> Vec<Task> {
        self.shared.lock().registry.tasks().to_vec()
    }

    /// Tasks waiting for a future run
    pub fn pending_tasks(&self) -> Vec<Task> {
        self.shared.lock().registry.pending().cloned().collect()
    }

    /// Tasks with a run in flight
    pub fn active_tasks(&self) -> Vec<Task> {
        self.shared.lock().registry.active().cloned().collect()
    }

    pub fn completed_ids(&self) -> Vec<String> {
        self.shared.lock().registry.completed_ids().to_vec()
    }

    /// Receive a signal on every change to the task set or task state
    pub fn subscribe(&self) -> broadcast::Receiver<TasksChanged> {
        self.shared.changes.subscribe()
    }

    /// One scheduling pass: start eligible tasks, then reap expired ones
    ///
    /// Never waits on actions. Started actions are spawned onto the current
    /// tokio runtime. Sends at most one change notification.
    pub fn tick(&self) -> TickReport {
        let (started, reaped, effects) = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;

            let (keys, mut effects) = state.registry.start_ready(&self.clock);
            let started: Vec<(TaskKey, Option<Action>)> = keys
                .into_iter()
                .map(|key| (key, state.actions.get(&key).cloned()))
                .collect();

            let reaped = state.registry.reap(self.clock.now());
            for task in &reaped {
                state.actions.remove(&task.key);
                effects.push(Effect::Emit(Event::TaskReaped {
                    key: task.key,
                    label: task.label().to_string(),
                }));
            }
            (started, reaped, effects)
        };

        log_effects(&effects);

        let report = TickReport {
            started: started.iter().map(|(key, _)| *key).collect(),
            reaped: reaped.iter().map(|t| t.key).collect(),
        };
        for (key, action) in started {
            tokio::spawn(self.clone().execute(key, action));
        }
        if report.changed() {
            self.shared.notify_changed();
        }
        report
    }

    /// Tick forever at the configured interval
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick();
        }
    }

    /// Spawn [`Self::run`] onto the current runtime
    pub fn spawn_ticker(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move { manager.run().await })
    }

    /// Resolve once no task has a run in flight
    pub async fn until_idle(&self) {
        self.wait_until(|registry| registry.running_count() == 0)
            .await
    }

    /// Resolve once every task has been reaped
    ///
    /// Only makes progress while something keeps ticking.
    pub async fn until_drained(&self) {
        self.wait_until(|registry| registry.tasks().is_empty())
            .await
    }

    async fn wait_until(&self, done: impl Fn(&TaskRegistry) -> bool) {
        let mut changes = self.subscribe();
        loop {
            if done(&self.shared.lock().registry) {
                return;
            }
            match changes.recv().await {
                Ok(TasksChanged) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                // The manager owns the sender, so this cannot happen while
                // `self` is alive
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    /// Run one iteration of an action and fold its result back in
    async fn execute(self, key: TaskKey, action: Option<Action>) {
        let result = match action {
            Some(action) => {
                let handle = TaskHandle::new(key, Arc::clone(&self.shared));
                // Call and poll on its own task so a panic from either is contained
                match tokio::spawn(async move { action(handle).await }).await {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => Err(TaskError::failed("action panicked")),
                    Err(_) => Err(TaskError::Cancelled),
                }
            }
            None => Err(TaskError::failed("no action configured")),
        };

        let effects = self
            .shared
            .lock()
            .registry
            .apply(key, TaskEvent::finished(result), &self.clock);
        self.run_effects(effects).await;
        self.shared.notify_changed();
    }

    async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            tracing::trace!(effect = effect.name(), fields = ?effect.fields(), "executing");
            match effect {
                Effect::Emit(event) => log_event(&event),
                Effect::Notify(notification) => {
                    if let Err(e) = self.notify.notify(notification).await {
                        tracing::warn!(error = %e, "notification not delivered");
                    }
                }
                // Absorbed by the registry
                Effect::RecordCompletion { .. } => {}
            }
        }
    }
}

fn log_effects(effects: &[Effect]) {
    for effect in effects {
        if let Effect::Emit(event) = effect {
            log_event(event);
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
