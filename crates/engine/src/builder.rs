// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fluent task configuration

use crate::action::{action_fn, Action};
use crate::{TaskHandle, TaskManager};
use std::future::Future;
use std::time::Duration;
use yard_adapters::NotifyAdapter;
use yard_core::{Clock, MaxIterations, TaskConfig, TaskError};

/// Immutable task configuration bound to a manager
///
/// Every setter returns a new builder and leaves the receiver untouched, so
/// a partially configured builder can serve as a template for many tasks.
#[derive(Clone)]
pub struct TaskBuilder<C: Clock, N: NotifyAdapter> {
    manager: TaskManager<C, N>,
    config: TaskConfig,
    action: Option<Action>,
}

impl<C, N> TaskBuilder<C, N>
where
    C: Clock,
    N: NotifyAdapter,
{
    pub(crate) fn new(manager: TaskManager<C, N>) -> Self {
        Self {
            manager,
            config: TaskConfig::default(),
            action: None,
        }
    }

    fn with(&self, f: impl FnOnce(&mut TaskConfig)) -> Self {
        let mut next = self.clone();
        f(&mut next.config);
        next
    }

    /// The configuration captured so far
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn id(&self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.with(|c| c.id = id)
    }

    pub fn name(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with(|c| c.name = name)
    }

    pub fn group(&self, group_id: impl Into<String>) -> Self {
        let group_id = group_id.into();
        self.with(|c| c.group_id = group_id)
    }

    /// Minimum spacing between the end of one run and the start of the next
    pub fn delay(&self, delay: Duration) -> Self {
        self.with(|c| c.delay = delay)
    }

    pub fn max_iterations(&self, max: impl Into<MaxIterations>) -> Self {
        let max = max.into();
        self.with(|c| c.max_iterations = max)
    }

    /// Run `times` times in total
    pub fn repeat(&self, times: u64) -> Self {
        self.max_iterations(times)
    }

    pub fn repeat_forever(&self) -> Self {
        self.max_iterations(MaxIterations::Unbounded)
    }

    /// Grant one extra attempt after every failed run
    pub fn retry_on_fail(&self, retry: bool) -> Self {
        self.with(|c| c.retry_on_fail = retry)
    }

    /// Require `id` (a task id or group id) to be completed first; appends
    pub fn depends_on(&self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.with(|c| c.dependencies.push(id))
    }

    /// Attach opaque metadata; later tags with the same name win
    pub fn tag(&self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.with(|c| {
            c.tags.insert(name, value);
        })
    }

    /// Set the work performed on every run
    pub fn action<F, Fut>(&self, f: F) -> Self
    where
        F: Fn(TaskHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.with_action(action_fn(f))
    }

    /// Set an already boxed action
    pub fn with_action(&self, action: Action) -> Self {
        Self {
            action: Some(action),
            ..self.clone()
        }
    }

    /// Register a task built from this configuration
    ///
    /// May be called any number of times; each call yields an independent
    /// task.
    pub fn schedule(&self) -> TaskHandle {
        self.manager
            .register(self.config.clone(), self.action.clone())
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
