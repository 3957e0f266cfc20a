// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `yard run <plan>` - Run a plan until every task is done

use super::Outcome;
use crate::output::{self, NotificationLine, OutputFormat};
use crate::plan::Plan;
use crate::shell;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, watch};
use yard_adapters::{ChannelNotifyAdapter, NotifyAdapter, TracedNotifyAdapter};
use yard_core::{Clock, Notification, SystemClock};
use yard_engine::{ConfigError, ManagerConfig, TaskManager};

#[derive(Args)]
pub struct RunArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// Manager config file (default: <config dir>/yard/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum number of tasks running at once
    #[arg(long)]
    pub max_parallel: Option<usize>,
}

/// Explicit path, else the per-user config file if present, else defaults
fn load_config(explicit: Option<&Path>) -> Result<ManagerConfig, ConfigError> {
    if let Some(path) = explicit {
        return ManagerConfig::load(path);
    }
    match dirs::config_dir().map(|dir| dir.join("yard").join("config.toml")) {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "using user config");
            ManagerConfig::load(&path)
        }
        _ => Ok(ManagerConfig::default()),
    }
}

/// Schedule every plan task from one shared base builder
fn schedule<C: Clock, N: NotifyAdapter>(
    manager: &TaskManager<C, N>,
    plan: &Plan,
    abort: &watch::Receiver<bool>,
) {
    let base = manager.build();
    for task in &plan.tasks {
        let mut builder = base
            .id(&task.id)
            .name(&task.name)
            .group(&task.group)
            .max_iterations(task.max_iterations())
            .retry_on_fail(task.retry_on_fail);
        if let Some(delay) = task.delay {
            builder = builder.delay(delay);
        }
        for dependency in &task.depends_on {
            builder = builder.depends_on(dependency);
        }
        for (name, value) in &task.tags {
            builder = builder.tag(name, value.clone());
        }
        builder
            .with_action(shell::action(task.command.clone(), abort.clone()))
            .schedule();
    }
}

pub async fn run(args: RunArgs, format: OutputFormat) -> Result<Outcome> {
    let plan = Plan::load(&args.plan)?;
    let mut config = load_config(args.config.as_deref())?;
    if let Some(max) = args.max_parallel {
        config.max_parallel_tasks = max;
    }

    let (notify, mut notifications) = ChannelNotifyAdapter::new();
    let manager = TaskManager::new(&config, SystemClock, TracedNotifyAdapter::new(notify));
    let (abort_tx, abort_rx) = watch::channel(false);

    schedule(&manager, &plan, &abort_rx);
    tracing::info!(
        tasks = plan.tasks.len(),
        max_parallel = config.max_parallel_tasks,
        "plan scheduled"
    );

    let ticker = manager.spawn_ticker();
    let mut failed = false;
    let mut signal_failed = false;

    let drained = manager.until_drained();
    tokio::pin!(drained);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let interrupted = loop {
        tokio::select! {
            biased;
            Some(notification) = notifications.recv() => {
                failed |= report(&notification, format);
            }
            () = &mut drained => break false,
            result = &mut ctrl_c, if !signal_failed => match result {
                Ok(()) => break true,
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                    signal_failed = true;
                }
            },
        }
    };

    ticker.abort();
    if interrupted {
        eprintln!("interrupted, cancelling running tasks");
        // Both receivers live in the scheduled actions
        let _ = abort_tx.send(true);
        manager.until_idle().await;
    }
    failed |= flush(&mut notifications, format);

    Ok(if interrupted {
        Outcome::Interrupted
    } else if failed {
        Outcome::TaskFailed
    } else {
        Outcome::Success
    })
}

/// Print one notification; true if it reports a failure
fn report(notification: &Notification, format: OutputFormat) -> bool {
    output::print(&NotificationLine(notification), format);
    notification.is_error()
}

fn flush(notifications: &mut mpsc::UnboundedReceiver<Notification>, format: OutputFormat) -> bool {
    let mut failed = false;
    while let Ok(notification) = notifications.try_recv() {
        failed |= report(&notification, format);
    }
    failed
}
