// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification delivery adapters

mod channel;
mod noop;

pub use channel::ChannelNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use async_trait::async_trait;
use thiserror::Error;
use yard_core::Notification;

/// Errors from notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification receiver closed")]
    Closed,
}

/// Adapter that surfaces task notifications to the user
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Deliver a notification
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}
