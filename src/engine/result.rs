// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Step and job results

use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::errors::ExecutionError;
use crate::executors::CommandOutcome;
use crate::matrix::JobVariant;

/// Overall status of a job or a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepStatus {
    /// Ran and exited zero
    Succeeded,
    /// Ran and exited non-zero
    Failed { exit_code: i32 },
    /// Could not be launched, timed out, or was killed
    Errored { error: String },
    /// Terminated because another job failed under fail-fast
    Cancelled,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { exit_code } => write!(f, "exited {}", exit_code),
            Self::Errored { error } => write!(f, "error: {}", error),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// Step name
    pub step: String,
    /// Position of the step in the job's step list
    pub index: usize,
    pub status: StepStatus,
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
    /// Tail of stderr for a step that did not succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_tail: Option<String>,
}

const STDERR_TAIL_LINES: usize = 20;

impl StepResult {
    /// Result for a command that produced an exit status
    pub fn from_outcome(step: &str, index: usize, outcome: CommandOutcome) -> Self {
        let status = if outcome.success() {
            StepStatus::Succeeded
        } else {
            StepStatus::Failed {
                exit_code: outcome.exit_code,
            }
        };

        let stderr_tail = (!status.is_success() && !outcome.stderr.trim().is_empty())
            .then(|| tail_lines(&outcome.stderr, STDERR_TAIL_LINES));

        Self {
            step: step.to_string(),
            index,
            status,
            duration: outcome.duration,
            stderr_tail,
        }
    }

    /// Result for a command that never produced an exit status
    pub fn from_error(step: &str, index: usize, error: &ExecutionError, duration: Duration) -> Self {
        let status = if error.is_cancellation() {
            StepStatus::Cancelled
        } else {
            StepStatus::Errored {
                error: error.to_string(),
            }
        };

        Self {
            step: step.to_string(),
            index,
            status,
            duration,
            stderr_tail: None,
        }
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

/// Result of one job variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResult {
    pub variant: JobVariant,
    /// Executed steps in execution order
    pub steps: Vec<StepResult>,
    pub status: Status,
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
}

impl JobResult {
    /// A variant that was cancelled before it started
    pub fn never_started(variant: JobVariant) -> Self {
        Self {
            variant,
            steps: vec![],
            status: Status::Skipped,
            duration: Duration::ZERO,
        }
    }

    /// A variant whose worker died without reporting
    pub fn lost(variant: JobVariant, reason: &str) -> Self {
        Self {
            variant,
            steps: vec![StepResult {
                step: "<worker>".into(),
                index: 0,
                status: StepStatus::Errored {
                    error: reason.to_string(),
                },
                duration: Duration::ZERO,
                stderr_tail: None,
            }],
            status: Status::Failed,
            duration: Duration::ZERO,
        }
    }

    pub fn label(&self) -> &str {
        &self.variant.label
    }
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
