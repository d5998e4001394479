// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Shell executor
//!
//! Runs step commands through a shell interpreter.

use async_trait::async_trait;
use std::future::Future;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::{CancelSignal, CommandExecutor, CommandOutcome, Invocation};
use crate::errors::ExecutionError;

/// Shell executor
pub struct ShellExecutor;

impl ShellExecutor {
    /// Create a new shell executor
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(
        &self,
        invocation: &Invocation,
        mut cancel: CancelSignal,
    ) -> Result<CommandOutcome, ExecutionError> {
        let program = which::which(&invocation.shell).map_err(|_| ExecutionError::NotFound {
            program: invocation.shell.clone(),
        })?;

        let start = Instant::now();

        let mut cmd = Command::new(program);
        cmd.arg("-c").arg(&invocation.command);
        cmd.current_dir(&invocation.working_dir);
        cmd.envs(&invocation.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the wait future below must take the process with it
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| ExecutionError::Spawn {
            message: format!("{} (in {})", e, invocation.working_dir.display()),
        })?;

        let wait = child.wait_with_output();

        let output = tokio::select! {
            result = wait_with_timeout(wait, invocation.timeout) => result?,
            _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
        };

        let duration = start.elapsed();

        let Some(exit_code) = output.status.code() else {
            return Err(ExecutionError::Killed);
        };

        Ok(CommandOutcome {
            exit_code,
            duration,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn check_available(&self, shell: &str) -> bool {
        which::which(shell).is_ok()
    }

    fn name(&self) -> &str {
        "shell"
    }
}

async fn wait_with_timeout<F>(wait: F, timeout: Option<Duration>) -> Result<Output, ExecutionError>
where
    F: Future<Output = std::io::Result<Output>>,
{
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| ExecutionError::Timeout {
                secs: limit.as_secs(),
            })?,
        None => wait.await,
    };

    result.map_err(|e| ExecutionError::Spawn {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::Canceller;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn invocation(command: &str) -> Invocation {
        Invocation {
            step: "test".into(),
            job: "default".into(),
            command: command.into(),
            shell: "sh".into(),
            working_dir: PathBuf::from("."),
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let executor = ShellExecutor::new();
        let outcome = executor
            .execute(&invocation("echo hello"), CancelSignal::never())
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(outcome.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_outcome() {
        let executor = ShellExecutor::new();
        let outcome = executor
            .execute(&invocation("exit 3"), CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 3);
    }

    #[tokio::test]
    async fn test_env_is_applied() {
        let executor = ShellExecutor::new();
        let mut inv = invocation("echo \"$MATRIX_OS\"");
        inv.env.insert("MATRIX_OS".into(), "20.04".into());

        let outcome = executor.execute(&inv, CancelSignal::never()).await.unwrap();
        assert_eq!(outcome.stdout.trim(), "20.04");
    }

    #[tokio::test]
    async fn test_missing_shell_is_not_found() {
        let executor = ShellExecutor::new();
        let mut inv = invocation("true");
        inv.shell = "definitely-not-a-shell-pipewright".into();

        let err = executor.execute(&inv, CancelSignal::never()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let executor = ShellExecutor::new();
        let mut inv = invocation("sleep 5");
        inv.timeout = Some(Duration::from_millis(100));

        let err = executor.execute(&inv, CancelSignal::never()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_terminates_command() {
        let executor = ShellExecutor::new();
        let canceller = Canceller::new();
        let signal = canceller.signal();

        let handle = tokio::spawn(async move {
            executor.execute(&invocation("sleep 5"), signal).await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("cancelled command should stop promptly")
            .unwrap();
        assert_eq!(result.unwrap_err(), ExecutionError::Cancelled);
    }
}
