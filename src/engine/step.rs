// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Step executor
//!
//! Runs one job variant's steps strictly in order. The first failing step
//! stops the remaining ordinary steps; steps marked `always` still run and
//! their results are recorded without masking an earlier failure.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::interpolate::{interpolate, matrix_env_name};
use super::result::{JobResult, Status, StepResult, StepStatus};
use crate::executors::{CancelSignal, CommandExecutor, Invocation};
use crate::matrix::JobVariant;
use crate::pipeline::Step;

/// Settings shared by every job of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    /// Pipeline name, exported as `PIPEWRIGHT_PIPELINE`
    pub pipeline: String,
    /// Root directory step working directories are resolved against
    pub working_dir: PathBuf,
    /// Pipeline-wide environment
    pub env: BTreeMap<String, String>,
}

/// Executes the steps of a single job variant
pub struct StepExecutor {
    executor: Arc<dyn CommandExecutor>,
    context: JobContext,
}

impl StepExecutor {
    pub fn new(executor: Arc<dyn CommandExecutor>, context: JobContext) -> Self {
        Self { executor, context }
    }

    /// Run all steps for a variant to completion
    pub async fn run(&self, variant: &JobVariant, steps: &[Step]) -> JobResult {
        self.run_with_cancel(variant, steps, CancelSignal::never())
            .await
    }

    /// Run all steps for a variant, stopping ordinary steps once `cancel` fires
    pub async fn run_with_cancel(
        &self,
        variant: &JobVariant,
        steps: &[Step],
        cancel: CancelSignal,
    ) -> JobResult {
        let start = Instant::now();
        let env = self.bind_environment(variant);

        let mut results = Vec::new();
        let mut failed = false;
        let mut cancelled = false;

        for (index, step) in steps.iter().enumerate() {
            if !step.always {
                if failed || cancelled {
                    continue;
                }
                if cancel.is_cancelled() {
                    cancelled = true;
                    continue;
                }
            }

            let invocation = self.invocation(variant, step, &env);
            // Cleanup steps are allowed to finish even under cancellation
            let signal = if step.always {
                CancelSignal::never()
            } else {
                cancel.clone()
            };

            let step_start = Instant::now();
            let result = match self.executor.execute(&invocation, signal).await {
                Ok(outcome) => StepResult::from_outcome(&step.name, index, outcome),
                Err(error) => {
                    StepResult::from_error(&step.name, index, &error, step_start.elapsed())
                }
            };

            match &result.status {
                StepStatus::Succeeded => {
                    tracing::debug!(
                        pipeline = %self.context.pipeline,
                        job = %variant.label,
                        step = %step.name,
                        duration_ms = result.duration.as_millis() as u64,
                        "step succeeded"
                    );
                }
                StepStatus::Cancelled => {
                    tracing::info!(job = %variant.label, step = %step.name, "step cancelled");
                    cancelled = true;
                }
                status => {
                    tracing::warn!(
                        pipeline = %self.context.pipeline,
                        job = %variant.label,
                        step = %step.name,
                        %status,
                        "step failed"
                    );
                    if !cancelled {
                        failed = true;
                    }
                }
            }

            results.push(result);
        }

        let status = if failed {
            Status::Failed
        } else if cancelled {
            Status::Skipped
        } else {
            Status::Success
        };

        JobResult {
            variant: variant.clone(),
            steps: results,
            status,
            duration: start.elapsed(),
        }
    }

    /// Environment every step of the variant starts from
    fn bind_environment(&self, variant: &JobVariant) -> BTreeMap<String, String> {
        let mut env = self.context.env.clone();
        for (dimension, value) in &variant.values {
            env.insert(matrix_env_name(dimension), value.clone());
        }
        env.insert("PIPEWRIGHT_PIPELINE".into(), self.context.pipeline.clone());
        env.insert("PIPEWRIGHT_JOB".into(), variant.label.clone());
        env
    }

    fn invocation(
        &self,
        variant: &JobVariant,
        step: &Step,
        base_env: &BTreeMap<String, String>,
    ) -> Invocation {
        let mut env = base_env.clone();
        env.extend(
            step.env
                .iter()
                .map(|(k, v)| (k.clone(), interpolate(v, variant))),
        );

        let working_dir = match &step.working_directory {
            Some(dir) => self
                .context
                .working_dir
                .join(interpolate(&dir.to_string_lossy(), variant)),
            None => self.context.working_dir.clone(),
        };

        Invocation {
            step: step.name.clone(),
            job: variant.label.clone(),
            command: interpolate(&step.run, variant),
            shell: step.shell.clone(),
            working_dir,
            env,
            timeout: step.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Behavior, ScriptedExecutor};
    use crate::errors::ExecutionError;
    use crate::matrix::{expand, MatrixSpec};

    fn variant() -> JobVariant {
        expand(&MatrixSpec::from_pairs([("os", vec!["20.04"]), ("py", vec!["3.7"])]))
            .unwrap()
            .remove(0)
    }

    fn step_executor(scripted: Arc<ScriptedExecutor>) -> StepExecutor {
        StepExecutor::new(
            scripted,
            JobContext {
                pipeline: "build".into(),
                working_dir: PathBuf::from("/repo"),
                env: BTreeMap::from([("CI".to_string(), "true".to_string())]),
            },
        )
    }

    fn step_names(result: &JobResult) -> Vec<&str> {
        result.steps.iter().map(|s| s.step.as_str()).collect()
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let scripted = Arc::new(ScriptedExecutor::new());
        let steps = vec![Step::new("a", "true"), Step::new("b", "true")];

        let result = step_executor(scripted.clone()).run(&variant(), &steps).await;

        assert_eq!(result.status, Status::Success);
        assert_eq!(step_names(&result), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_steps() {
        let scripted = Arc::new(ScriptedExecutor::new().on_step("b", Behavior::Exit(1)));
        let steps = vec![
            Step::new("a", "true"),
            Step::new("b", "false"),
            Step::new("c", "true"),
        ];

        let result = step_executor(scripted.clone()).run(&variant(), &steps).await;

        assert_eq!(result.status, Status::Failed);
        assert_eq!(step_names(&result), vec!["a", "b"]);
        assert_eq!(result.steps[1].status, StepStatus::Failed { exit_code: 1 });
        assert_eq!(scripted.invoked_steps("20.04, 3.7"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_always_step_runs_after_failure() {
        let scripted = Arc::new(
            ScriptedExecutor::new()
                .on_step("b", Behavior::Exit(1))
                .on_step("cleanup", Behavior::Exit(7)),
        );
        let steps = vec![
            Step::new("a", "true"),
            Step::new("b", "false"),
            Step::new("c", "true"),
            Step::new("cleanup", "rm -rf out").always(),
        ];

        let result = step_executor(scripted).run(&variant(), &steps).await;

        assert_eq!(result.status, Status::Failed);
        assert_eq!(step_names(&result), vec!["a", "b", "cleanup"]);
        assert_eq!(result.steps[2].index, 3);
        // Recorded, but the job was already failed by 'b'
        assert_eq!(result.steps[2].status, StepStatus::Failed { exit_code: 7 });
    }

    #[tokio::test]
    async fn test_failing_always_step_fails_clean_job() {
        let scripted = Arc::new(ScriptedExecutor::new().on_step("cleanup", Behavior::Exit(1)));
        let steps = vec![Step::new("a", "true"), Step::new("cleanup", "x").always()];

        let result = step_executor(scripted).run(&variant(), &steps).await;
        assert_eq!(result.status, Status::Failed);
    }

    #[tokio::test]
    async fn test_execution_error_terminates_job() {
        let scripted = Arc::new(ScriptedExecutor::new().on_step(
            "a",
            Behavior::Error(ExecutionError::NotFound {
                program: "bash".into(),
            }),
        ));
        let steps = vec![Step::new("a", "true"), Step::new("b", "true")];

        let result = step_executor(scripted).run(&variant(), &steps).await;

        assert_eq!(result.status, Status::Failed);
        assert_eq!(step_names(&result), vec!["a"]);
        assert!(matches!(result.steps[0].status, StepStatus::Errored { .. }));
    }

    #[tokio::test]
    async fn test_zero_steps_succeeds() {
        let scripted = Arc::new(ScriptedExecutor::new());
        let result = step_executor(scripted).run(&variant(), &[]).await;
        assert_eq!(result.status, Status::Success);
        assert!(result.steps.is_empty());
    }

    #[tokio::test]
    async fn test_variant_bound_into_invocation() {
        let scripted = Arc::new(ScriptedExecutor::new());
        let mut step = Step::new("test", "tox -e py${{ matrix.py }}");
        step.working_directory = Some(PathBuf::from("images/${{ matrix.os }}"));
        step.env.insert("TARGET".into(), "${{ matrix.os }}".into());
        step.timeout_secs = Some(30);

        step_executor(scripted.clone()).run(&variant(), &[step]).await;

        let inv = scripted.invocations().remove(0);
        assert_eq!(inv.command, "tox -e py3.7");
        assert_eq!(inv.working_dir, PathBuf::from("/repo/images/20.04"));
        assert_eq!(inv.env["MATRIX_OS"], "20.04");
        assert_eq!(inv.env["MATRIX_PY"], "3.7");
        assert_eq!(inv.env["TARGET"], "20.04");
        assert_eq!(inv.env["CI"], "true");
        assert_eq!(inv.env["PIPEWRIGHT_JOB"], "20.04, 3.7");
        assert_eq!(inv.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_only_cleanup() {
        let scripted = Arc::new(ScriptedExecutor::new());
        let canceller = crate::executors::Canceller::new();
        canceller.cancel();

        let steps = vec![Step::new("a", "true"), Step::new("cleanup", "x").always()];
        let result = step_executor(scripted)
            .run_with_cancel(&variant(), &steps, canceller.signal())
            .await;

        assert_eq!(result.status, Status::Skipped);
        assert_eq!(step_names(&result), vec!["cleanup"]);
    }
}
