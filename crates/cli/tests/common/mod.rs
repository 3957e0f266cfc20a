// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fast timings so runs finish quickly and failures are reaped at once
pub const FAST_CONFIG: &str = r#"
tick_interval = "10ms"
failure_backoff = "20ms"
failed_retention = "0s"
status_pause = "0ms"
"#;

/// A scratch directory holding a plan and a config file
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(dir.path().join("config.toml"), FAST_CONFIG)
            .expect("Failed to write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// Write `content` as `plan.toml` and return its path
    pub fn plan(&self, content: &str) -> PathBuf {
        let path = self.path().join("plan.toml");
        std::fs::write(&path, content).expect("Failed to write plan");
        path
    }

    /// `yard` running inside the scratch directory, isolated from user config
    pub fn yard(&self) -> Command {
        let mut cmd = Command::cargo_bin("yard").expect("yard binary");
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path())
            .env("HOME", self.path())
            .env_remove("RUST_LOG");
        cmd
    }
}
