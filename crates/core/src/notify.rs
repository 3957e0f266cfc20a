// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notifications surfaced when a run finishes

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a success notification stays on screen
pub const SUCCESS_AUTO_HIDE: Duration = Duration::from_secs(2);

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    /// `None` keeps the notification until dismissed
    pub auto_hide: Option<Duration>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Success,
            message: message.into(),
            auto_hide: Some(SUCCESS_AUTO_HIDE),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
            auto_hide: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotifyLevel::Error
    }
}
