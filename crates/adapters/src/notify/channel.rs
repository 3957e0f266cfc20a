// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel-backed notify adapter

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tokio::sync::mpsc;
use yard_core::Notification;

/// Forwards notifications to a receiver owned by the presentation layer
#[derive(Clone, Debug)]
pub struct ChannelNotifyAdapter {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifyAdapter {
    /// Create an adapter and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotifyAdapter for ChannelNotifyAdapter {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.tx.send(notification).map_err(|_| NotifyError::Closed)
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
