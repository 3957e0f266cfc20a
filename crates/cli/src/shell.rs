// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command actions

use std::process::{ExitStatus, Stdio};
use tokio::sync::watch;
use yard_core::TaskError;
use yard_engine::{action_fn, Action, TaskHandle};

/// Action that runs `command` with `sh -c` on every iteration
///
/// Raising `abort` kills a running command and ends its run as cancelled.
pub fn action(command: String, abort: watch::Receiver<bool>) -> Action {
    action_fn(move |task: TaskHandle| run(command.clone(), abort.clone(), task))
}

async fn run(
    command: String,
    abort: watch::Receiver<bool>,
    task: TaskHandle,
) -> Result<(), TaskError> {
    if *abort.borrow() {
        return Err(TaskError::Cancelled);
    }

    task.set_status(format!("$ {}", command)).await;
    let mut child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    tracing::debug!(task = %task.key(), pid = ?child.id(), command = command.as_str(), "spawned");

    let exited = tokio::select! {
        status = child.wait() => Some(status),
        () = aborted(abort) => None,
    };

    match exited {
        Some(status) => {
            let status = status?;
            if status.success() {
                Ok(())
            } else {
                Err(TaskError::failed(describe(status)))
            }
        }
        None => {
            if let Err(e) = child.kill().await {
                tracing::warn!(task = %task.key(), error = %e, "kill failed");
            }
            Err(TaskError::Cancelled)
        }
    }
}

/// Resolve once the abort flag is raised; never if the sender goes away
async fn aborted(mut abort: watch::Receiver<bool>) {
    loop {
        if *abort.borrow_and_update() {
            return;
        }
        if abort.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
