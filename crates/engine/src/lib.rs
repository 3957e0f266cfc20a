// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Yard task engine runtime
//!
//! Wraps the pure registry from `yard-core` with a tick loop, action
//! execution on tokio, and the fluent builder API.

mod action;
mod builder;
mod config;
mod error;
mod events;
mod handle;
mod manager;

pub use action::{action_fn, Action, ActionFuture};
pub use builder::TaskBuilder;
pub use config::{ManagerConfig, DEFAULT_STATUS_PAUSE, DEFAULT_TICK_INTERVAL};
pub use error::ConfigError;
pub use events::TasksChanged;
pub use handle::TaskHandle;
pub use manager::{TaskManager, TickReport};
