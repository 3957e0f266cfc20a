// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::notify::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tracing::Instrument;
use yard_core::Notification;

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let span = tracing::debug_span!("notify", level = ?notification.level);

        async move {
            tracing::debug!(message = %notification.message, "delivering");

            let start = std::time::Instant::now();
            let result = self.inner.notify(notification).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "delivered"),
                // Nobody is listening any more
                Err(NotifyError::Closed) => tracing::debug!("receiver closed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
