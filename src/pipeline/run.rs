// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline run results

use serde::Serialize;
use std::time::Duration;

use crate::engine::{serialize_millis, JobResult, Status};
use crate::errors::PipewrightError;
use crate::filter::{Event, FilterDecision};

/// Aggregated result of running one pipeline for one event
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub pipeline: String,
    pub event: Event,
    pub decision: FilterDecision,
    /// One result per job variant, in expansion order
    pub jobs: Vec<JobResult>,
    pub status: Status,
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
}

impl PipelineRun {
    /// A run the filter turned down
    pub fn skipped(pipeline: &str, event: Event, decision: FilterDecision) -> Self {
        Self {
            pipeline: pipeline.to_string(),
            event,
            decision,
            jobs: vec![],
            status: Status::Skipped,
            duration: Duration::ZERO,
        }
    }

    /// A run that executed jobs; failed if any job failed
    pub fn completed(
        pipeline: &str,
        event: Event,
        decision: FilterDecision,
        jobs: Vec<JobResult>,
        duration: Duration,
    ) -> Self {
        let status = if jobs.iter().any(|j| j.status == Status::Failed) {
            Status::Failed
        } else {
            Status::Success
        };

        Self {
            pipeline: pipeline.to_string(),
            event,
            decision,
            jobs,
            status,
            duration,
        }
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobResult> {
        self.jobs.iter().filter(|j| j.status == Status::Failed)
    }

    /// BLAKE3 hash of the run's structure, ignoring timings
    ///
    /// Two runs of the same event and definition against a deterministic
    /// executor produce the same fingerprint.
    pub fn fingerprint(&self) -> Result<String, PipewrightError> {
        let mut value = serde_json::to_value(self)?;
        strip_durations(&mut value);
        let bytes = serde_json::to_vec(&value)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

fn strip_durations(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("duration_ms");
            map.values_mut().for_each(strip_durations);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_durations),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{RunReason, TriggerKind};
    use crate::matrix::{expand, MatrixSpec};

    fn run_with_duration(duration: Duration) -> PipelineRun {
        let variant = expand(&MatrixSpec::default()).unwrap().remove(0);
        let mut job = JobResult::never_started(variant);
        job.status = Status::Success;
        job.duration = duration;

        PipelineRun::completed(
            "build",
            Event::new(TriggerKind::Push, ["src/lib.rs"]),
            FilterDecision::Run {
                reason: RunReason::RelevantChange {
                    path: "src/lib.rs".into(),
                },
            },
            vec![job],
            duration,
        )
    }

    #[test]
    fn test_fingerprint_ignores_durations() {
        let a = run_with_duration(Duration::from_millis(5));
        let b = run_with_duration(Duration::from_secs(3));
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_tracks_status() {
        let a = run_with_duration(Duration::ZERO);
        let mut b = a.clone();
        b.jobs[0].status = Status::Failed;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_any_failed_job_fails_run() {
        let variants = expand(&MatrixSpec::from_pairs([("os", vec!["a", "b"])])).unwrap();
        let mut jobs: Vec<_> = variants.into_iter().map(JobResult::never_started).collect();
        jobs[0].status = Status::Success;
        jobs[1].status = Status::Failed;

        let run = PipelineRun::completed(
            "build",
            Event::new(TriggerKind::Push, Vec::<String>::new()),
            FilterDecision::Run {
                reason: RunReason::UnknownDiff,
            },
            jobs,
            Duration::ZERO,
        );
        assert_eq!(run.status, Status::Failed);
        assert_eq!(run.failed_jobs().count(), 1);
    }
}
