// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `yard check <plan>` - Validate a plan without running it

use crate::output::{self, OutputFormat};
use crate::plan::Plan;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,
}

#[derive(Serialize)]
struct PlanSummary {
    tasks: usize,
    groups: Vec<String>,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plan ok: {} tasks", self.tasks)?;
        if !self.groups.is_empty() {
            write!(f, " (groups: {})", self.groups.join(", "))?;
        }
        Ok(())
    }
}

pub fn check(args: CheckArgs, format: OutputFormat) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    let summary = PlanSummary {
        tasks: plan.tasks.len(),
        groups: plan.groups(),
    };
    output::print(&summary, format);
    Ok(())
}
