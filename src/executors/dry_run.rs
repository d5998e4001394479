// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Dry-run executor
//!
//! Reports every command as succeeding without running anything, so a
//! pipeline's filtering, expansion and step plan can be inspected safely.

use async_trait::async_trait;
use std::time::Duration;

use super::{CancelSignal, CommandExecutor, CommandOutcome, Invocation};
use crate::errors::ExecutionError;

#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl DryRunExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn execute(
        &self,
        invocation: &Invocation,
        _cancel: CancelSignal,
    ) -> Result<CommandOutcome, ExecutionError> {
        tracing::info!(
            job = %invocation.job,
            step = %invocation.step,
            command = %invocation.command,
            working_dir = %invocation.working_dir.display(),
            "dry run"
        );

        Ok(CommandOutcome::exited(0, Duration::ZERO))
    }

    async fn check_available(&self, _shell: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
