// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Changed paths from a git diff

use std::path::Path;
use tokio::process::Command;

use super::{Event, TriggerKind};
use crate::errors::PipewrightError;

impl Event {
    /// Build an event from the files changed between `base` and the working tree
    pub async fn from_git_diff(
        kind: TriggerKind,
        base: &str,
        repo_dir: &Path,
    ) -> Result<Self, PipewrightError> {
        let git = which::which("git").map_err(|_| PipewrightError::EventSource {
            message: "git is not installed or not on PATH".into(),
        })?;

        let output = Command::new(git)
            .args(["diff", "--name-only", base])
            .current_dir(repo_dir)
            .output()
            .await
            .map_err(|e| PipewrightError::EventSource {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PipewrightError::EventSource {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let event = Self::new(kind, stdout.lines());

        tracing::debug!(
            base,
            changed = event.changed_paths.len(),
            "Collected changed paths from git"
        );

        Ok(event)
    }
}
