// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Scripted command executor for engine tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::ExecutionError;
use crate::executors::{CancelSignal, CommandExecutor, CommandOutcome, Invocation};

/// What a scripted command does
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Exit immediately with the code
    Exit(i32),
    /// Sleep, then exit with the code; cancellable
    Delay(Duration, i32),
    /// Block until cancelled
    WaitForCancel,
    /// Fail without an exit status
    Error(ExecutionError),
    /// Panic inside the job's task
    Panic,
}

/// Executor that answers from a script instead of running processes
pub struct ScriptedExecutor {
    by_job_step: HashMap<(String, String), Behavior>,
    by_step: HashMap<String, Behavior>,
    default: Behavior,
    invocations: Mutex<Vec<Invocation>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            by_job_step: HashMap::new(),
            by_step: HashMap::new(),
            default: Behavior::Exit(0),
            invocations: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_default(mut self, behavior: Behavior) -> Self {
        self.default = behavior;
        self
    }

    pub fn on_step(mut self, step: &str, behavior: Behavior) -> Self {
        self.by_step.insert(step.to_string(), behavior);
        self
    }

    pub fn on_job_step(mut self, job: &str, step: &str, behavior: Behavior) -> Self {
        self.by_job_step
            .insert((job.to_string(), step.to_string()), behavior);
        self
    }

    /// Every invocation received, in arrival order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Step names invoked for one job, in arrival order
    pub fn invoked_steps(&self, job: &str) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|inv| inv.job == job)
            .map(|inv| inv.step)
            .collect()
    }

    /// Highest number of commands observed running at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, invocation: &Invocation) -> Behavior {
        self.by_job_step
            .get(&(invocation.job.clone(), invocation.step.clone()))
            .or_else(|| self.by_step.get(&invocation.step))
            .unwrap_or(&self.default)
            .clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        invocation: &Invocation,
        mut cancel: CancelSignal,
    ) -> Result<CommandOutcome, ExecutionError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let result = match self.behavior_for(invocation) {
            Behavior::Exit(code) => Ok(CommandOutcome::exited(code, Duration::ZERO)),
            Behavior::Delay(delay, code) => tokio::select! {
                _ = tokio::time::sleep(delay) => Ok(CommandOutcome::exited(code, delay)),
                _ = cancel.cancelled() => Err(ExecutionError::Cancelled),
            },
            Behavior::WaitForCancel => {
                cancel.cancelled().await;
                Err(ExecutionError::Cancelled)
            }
            Behavior::Error(error) => Err(error),
            Behavior::Panic => panic!("scripted panic in {}/{}", invocation.job, invocation.step),
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn check_available(&self, _shell: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
