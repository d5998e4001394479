// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Job scheduler
//!
//! Runs every job variant of a pipeline concurrently, bounded by the
//! pipeline's parallelism limit, and applies the fail-fast policy.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::result::{JobResult, Status};
use super::step::StepExecutor;
use crate::executors::Canceller;
use crate::matrix::JobVariant;
use crate::pipeline::Step;

/// Scheduling policy of one pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Cancel every other job once one fails
    pub fail_fast: bool,
    /// Jobs allowed to run at once; `None` runs them all together
    pub max_parallel: Option<usize>,
}

/// Runs job variants concurrently
pub struct JobScheduler {
    step_executor: Arc<StepExecutor>,
}

impl JobScheduler {
    pub fn new(step_executor: Arc<StepExecutor>) -> Self {
        Self { step_executor }
    }

    /// Run all variants and return one result per variant, in variant order
    ///
    /// Under fail-fast, the first failed job cancels the rest: running jobs
    /// stop their current command and skip their remaining ordinary steps,
    /// and jobs still waiting for a slot are never started.
    pub async fn schedule(
        &self,
        variants: Vec<JobVariant>,
        steps: Arc<[Step]>,
        policy: SchedulePolicy,
    ) -> Vec<JobResult> {
        // No more slots than jobs; keeps the semaphore within its permit limit
        let limit = policy
            .max_parallel
            .unwrap_or(variants.len())
            .min(variants.len())
            .max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let canceller = Canceller::new();

        let mut results = Vec::with_capacity(variants.len());
        let mut in_flight: BTreeMap<usize, JobVariant> = BTreeMap::new();
        let mut tasks = JoinSet::new();

        for variant in variants {
            // Slots are handed out in variant order
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    results.push(JobResult::never_started(variant));
                    continue;
                }
            };

            if canceller.is_cancelled() {
                tracing::debug!(job = %variant.label, "job not started after cancellation");
                results.push(JobResult::never_started(variant));
                continue;
            }

            in_flight.insert(variant.index, variant.clone());

            let step_executor = self.step_executor.clone();
            let steps = steps.clone();
            let canceller = canceller.clone();
            let fail_fast = policy.fail_fast;

            tasks.spawn(async move {
                tracing::info!(job = %variant.label, "job started");
                let result = step_executor
                    .run_with_cancel(&variant, &steps, canceller.signal())
                    .await;

                tracing::info!(
                    job = %variant.label,
                    status = %result.status,
                    duration_ms = result.duration.as_millis() as u64,
                    "job finished"
                );

                if fail_fast && result.status == Status::Failed && !canceller.is_cancelled() {
                    tracing::warn!(job = %variant.label, "fail-fast: cancelling remaining jobs");
                    canceller.cancel();
                }

                // Cancellation is visible before the slot is released
                drop(permit);
                result
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    in_flight.remove(&result.variant.index);
                    results.push(result);
                }
                Err(e) => tracing::error!(error = %e, "job worker failed"),
            }
        }

        // Workers that panicked never reported back
        for (_, variant) in in_flight {
            results.push(JobResult::lost(variant, "job worker terminated unexpectedly"));
        }

        results.sort_by_key(|r| r.variant.index);
        results
    }
}
