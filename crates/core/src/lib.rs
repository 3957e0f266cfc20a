// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! yard-core: pure state for the Yard background-task engine
//!
//! This crate provides:
//! - The task record and its state machine
//! - The registry that decides starts, tracks completions, and reaps
//! - Effects and events for the runtime to carry out
//! - A clock abstraction for testable timing

pub mod clock;
pub mod effect;
pub mod error;
pub mod notify;
pub mod registry;
pub mod task;
pub mod traced;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::{Effect, Event};
pub use error::TaskError;
pub use notify::{Notification, NotifyLevel};
pub use registry::{Blocked, SchedulePolicy, TaskRegistry};
pub use task::{
    MaxIterations, Task, TaskConfig, TaskEvent, TaskKey, TaskReport,
    PROGRESS_INDETERMINATE,
};
pub use traced::TracedEffect;
