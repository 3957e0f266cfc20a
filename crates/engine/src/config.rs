// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use yard_core::registry::{
    DEFAULT_COMPLETED_RETENTION, DEFAULT_FAILED_RETENTION, DEFAULT_FAILURE_BACKOFF,
};
use yard_core::SchedulePolicy;

/// Default period of the scheduling tick
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Default cooperative pause after a status update
pub const DEFAULT_STATUS_PAUSE: Duration = Duration::from_millis(10);

/// Tunables for a [`crate::TaskManager`]
///
/// Every field is optional in TOML; durations use humantime syntax
/// (`"100ms"`, `"15s"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    pub max_parallel_tasks: usize,
    /// Floor on the delay after a failed run
    #[serde(with = "humantime_serde")]
    pub failure_backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub completed_retention: Duration,
    #[serde(with = "humantime_serde")]
    pub failed_retention: Duration,
    #[serde(with = "humantime_serde")]
    pub status_pause: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_parallel_tasks: 1,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            completed_retention: DEFAULT_COMPLETED_RETENTION,
            failed_retention: DEFAULT_FAILED_RETENTION,
            status_pause: DEFAULT_STATUS_PAUSE,
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ManagerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Timing rules handed to the registry
    pub fn policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            failure_backoff: self.failure_backoff,
            completed_retention: self.completed_retention,
            failed_retention: self.failed_retention,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
