// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task actions

use crate::TaskHandle;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use yard_core::TaskError;

/// Future returned by one run of an action
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// The asynchronous work of a task, invoked once per run
///
/// Shared so that a builder can be scheduled many times.
pub type Action = Arc<dyn Fn(TaskHandle) -> ActionFuture + Send + Sync>;

/// Wrap an async closure as an [`Action`]
pub fn action_fn<F, Fut>(f: F) -> Action
where
    F: Fn(TaskHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    Arc::new(move |handle| Box::pin(f(handle)) as ActionFuture)
}
