// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Command executors
//!
//! The engine treats every step as an opaque command with an exit status.
//! This module defines the seam through which commands are handed to
//! whatever actually runs them, plus the built-in implementations.

mod cancel;
mod dry_run;
mod shell;

pub use cancel::{CancelSignal, Canceller};
pub use dry_run::DryRunExecutor;
pub use shell::ShellExecutor;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ExecutionError;

/// Everything needed to run one step of one job variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Step name
    pub step: String,
    /// Label of the job variant the step belongs to
    pub job: String,
    /// Command text with matrix placeholders already substituted
    pub command: String,
    /// Interpreter the command is passed to with `-c`
    pub shell: String,
    /// Directory the command runs in
    pub working_dir: PathBuf,
    /// Complete environment overlay for the command
    pub env: BTreeMap<String, String>,
    /// Limit after which the command is terminated
    pub timeout: Option<Duration>,
}

/// A command that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    /// Create an outcome with no captured output
    pub fn exited(exit_code: i32, duration: Duration) -> Self {
        Self {
            exit_code,
            duration,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for command executors
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command until it exits, is cancelled, or cannot be run
    ///
    /// A command that runs and exits non-zero is an `Ok` outcome. `Err` is
    /// reserved for commands that never produced an exit status.
    async fn execute(
        &self,
        invocation: &Invocation,
        cancel: CancelSignal,
    ) -> Result<CommandOutcome, ExecutionError>;

    /// Check whether the given interpreter can be used
    async fn check_available(&self, shell: &str) -> bool;

    /// Short name for logs
    fn name(&self) -> &str;
}
