// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use yard_core::Notification;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(value) {
                println!("{}", json);
            }
        }
    }
}

/// A notification as one line of output
#[derive(Serialize)]
#[serde(transparent)]
pub struct NotificationLine<'a>(pub &'a Notification);

impl fmt::Display for NotificationLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.0.is_error() { '✗' } else { '✓' };
        write!(f, "{} {}", mark, self.0.message)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
