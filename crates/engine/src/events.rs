// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change notifications and event logging

use yard_core::Event;

/// Zero-payload signal that the task set or some task's state changed
///
/// Receivers re-read whatever they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TasksChanged;

/// Log an emitted task event at the level its kind deserves
pub(crate) fn log_event(event: &Event) {
    match event {
        Event::TaskScheduled { key, label } => {
            tracing::debug!(task = %key, label = label.as_str(), "scheduled")
        }
        Event::TaskStarted {
            key,
            label,
            iteration,
        } => tracing::info!(task = %key, label = label.as_str(), iteration, "started"),
        Event::TaskSucceeded { key, label } => {
            tracing::info!(task = %key, label = label.as_str(), "succeeded")
        }
        Event::TaskFailed {
            key,
            label,
            message,
            retrying,
        } => tracing::warn!(
            task = %key,
            label = label.as_str(),
            error = message.as_str(),
            retrying,
            "failed"
        ),
        Event::TaskCancelled { key, label } => {
            tracing::warn!(task = %key, label = label.as_str(), "cancelled")
        }
        Event::TaskStatus { key, status } => {
            tracing::debug!(task = %key, status = status.as_str(), "status")
        }
        Event::TaskProgress { key, progress } => {
            tracing::trace!(task = %key, progress, "progress")
        }
        Event::TaskReaped { key, label } => {
            tracing::debug!(task = %key, label = label.as_str(), "reaped")
        }
    }
}
