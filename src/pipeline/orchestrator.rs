// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline orchestrator
//!
//! Top-level driver: filter the event, expand the matrix, schedule the jobs
//! and aggregate their results. Step failures never escape as errors; the
//! only way a run does not produce a [`PipelineRun`] is a configuration error.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::compile::Pipeline;
use super::definition::PipelineDefinition;
use super::run::PipelineRun;
use crate::engine::{JobContext, JobScheduler, StepExecutor};
use crate::errors::ConfigError;
use crate::executors::CommandExecutor;
use crate::filter::Event;

/// Runs pipelines against events
pub struct PipelineOrchestrator {
    executor: Arc<dyn CommandExecutor>,
    working_dir: PathBuf,
}

impl PipelineOrchestrator {
    /// Create an orchestrator running commands in `working_dir`
    pub fn new(executor: Arc<dyn CommandExecutor>, working_dir: &Path) -> Self {
        Self {
            executor,
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Compile a definition and run it
    pub async fn run_definition(
        &self,
        event: &Event,
        definition: &PipelineDefinition,
    ) -> Result<PipelineRun, ConfigError> {
        let pipeline = Pipeline::compile(definition)?;
        self.run(event, &pipeline).await
    }

    /// Run a compiled pipeline for an event
    pub async fn run(&self, event: &Event, pipeline: &Pipeline) -> Result<PipelineRun, ConfigError> {
        let decision = pipeline.decide(event);

        if !decision.triggered() {
            tracing::info!(pipeline = %pipeline.name, %decision, "pipeline skipped");
            return Ok(PipelineRun::skipped(&pipeline.name, event.clone(), decision));
        }

        let start = Instant::now();
        let variants = pipeline.variants()?;

        tracing::info!(
            pipeline = %pipeline.name,
            %decision,
            jobs = variants.len(),
            fail_fast = pipeline.policy.fail_fast,
            "pipeline started"
        );

        let step_executor = StepExecutor::new(
            self.executor.clone(),
            JobContext {
                pipeline: pipeline.name.clone(),
                working_dir: self.working_dir.clone(),
                env: pipeline.env.clone(),
            },
        );
        let scheduler = JobScheduler::new(Arc::new(step_executor));

        let jobs = scheduler
            .schedule(variants, pipeline.steps.clone(), pipeline.policy)
            .await;

        let run = PipelineRun::completed(
            &pipeline.name,
            event.clone(),
            decision,
            jobs,
            start.elapsed(),
        );

        tracing::info!(
            pipeline = %run.pipeline,
            status = %run.status,
            duration_ms = run.duration.as_millis() as u64,
            "pipeline finished"
        );

        Ok(run)
    }
}
