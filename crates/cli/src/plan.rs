// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan files: a TOML list of shell tasks

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use yard_core::MaxIterations;

/// Errors that can occur while loading a plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("plan has no tasks")]
    Empty,
    #[error("task {task}: missing command")]
    MissingCommand { task: String },
    #[error("task {task}: `repeat` and `forever` are mutually exclusive")]
    RepeatConflict { task: String },
    #[error("task {task}: `repeat` must be at least 1")]
    ZeroRepeat { task: String },
    #[error("task {task}: unknown dependency `{dependency}`")]
    UnknownDependency { task: String, dependency: String },
}

/// A parsed plan
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default, rename = "task")]
    pub tasks: Vec<PlanTask>,
}

/// One `[[task]]` entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlanTask {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: String,
    /// Run with `sh -c`
    #[serde(default)]
    pub command: String,
    #[serde(default, with = "humantime_serde")]
    pub delay: Option<Duration>,
    #[serde(default)]
    pub repeat: Option<u64>,
    #[serde(default)]
    pub forever: bool,
    #[serde(default)]
    pub retry_on_fail: bool,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
}

impl PlanTask {
    pub fn max_iterations(&self) -> MaxIterations {
        if self.forever {
            MaxIterations::Unbounded
        } else {
            MaxIterations::Limited(self.repeat.unwrap_or(1))
        }
    }

    /// How errors refer to this task: id, else name, else position
    fn describe(&self, index: usize) -> String {
        if !self.id.is_empty() {
            self.id.clone()
        } else if !self.name.is_empty() {
            format!("\"{}\"", self.name)
        } else {
            format!("#{}", index + 1)
        }
    }
}

impl Plan {
    /// Parse and validate a plan from TOML content
    pub fn parse(content: &str) -> Result<Self, PlanError> {
        let plan: Plan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Read and validate a plan file
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.tasks.is_empty() {
            return Err(PlanError::Empty);
        }

        // Anything a dependency may name
        let known: HashSet<&str> = self
            .tasks
            .iter()
            .flat_map(|t| [t.id.as_str(), t.group.as_str()])
            .filter(|id| !id.is_empty())
            .collect();

        for (index, task) in self.tasks.iter().enumerate() {
            if task.command.trim().is_empty() {
                return Err(PlanError::MissingCommand {
                    task: task.describe(index),
                });
            }
            match (task.repeat, task.forever) {
                (Some(_), true) => {
                    return Err(PlanError::RepeatConflict {
                        task: task.describe(index),
                    })
                }
                (Some(0), false) => {
                    return Err(PlanError::ZeroRepeat {
                        task: task.describe(index),
                    })
                }
                _ => {}
            }
            if let Some(dependency) = task
                .depends_on
                .iter()
                .find(|d| !known.contains(d.as_str()))
            {
                return Err(PlanError::UnknownDependency {
                    task: task.describe(index),
                    dependency: dependency.clone(),
                });
            }
        }

        Ok(())
    }

    /// Distinct non-empty group ids, in first-seen order
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        for task in &self.tasks {
            if !task.group.is_empty() && !groups.contains(&task.group) {
                groups.push(task.group.clone());
            }
        }
        groups
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
