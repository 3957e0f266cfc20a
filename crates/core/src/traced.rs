// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured tracing metadata for effects

use crate::effect::Effect;

/// Trait for operations that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedEffect {
    /// Effect name for log spans (e.g., "emit", "notify")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::RecordCompletion { .. } => "record_completion",
            Effect::Notify(_) => "notify",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit(event) => vec![
                ("event", event.name().to_string()),
                ("task", event.key().to_string()),
            ],
            Effect::RecordCompletion { ids } => vec![("ids", ids.join(","))],
            Effect::Notify(notification) => vec![
                ("level", format!("{:?}", notification.level)),
                ("message", notification.message.clone()),
            ],
        }
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
