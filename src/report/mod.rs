// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Run reports
//!
//! Renders pipeline runs for people (colored text) and for machines (JSON).

use colored::Colorize;
use std::fmt::Write;

use crate::errors::PipewrightError;
use crate::pipeline::PipelineRun;
use crate::utils::{status_glyph, status_word, step_glyph};

/// Render a run as indented, colored text
pub fn render_text(run: &PipelineRun) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}  {}  {}",
        status_glyph(run.status),
        run.pipeline.bold(),
        status_word(run.status),
        format!("({} job(s), {})", run.jobs.len(), seconds(run.duration)).dimmed()
    );
    let _ = writeln!(out, "  {} {}", "event:".dimmed(), run.event.kind);
    let _ = writeln!(out, "  {} {}", "filter:".dimmed(), run.decision);

    for job in &run.jobs {
        let _ = writeln!(
            out,
            "  {} {}  {}",
            status_glyph(job.status),
            job.label(),
            seconds(job.duration).dimmed()
        );

        for step in &job.steps {
            let detail = if step.status.is_success() {
                String::new()
            } else {
                format!("  {}", step.status)
            };
            let _ = writeln!(out, "      {} {}{}", step_glyph(&step.status), step.step, detail);

            if let Some(tail) = &step.stderr_tail {
                for line in tail.lines() {
                    let _ = writeln!(out, "        {} {}", "|".dimmed(), line);
                }
            }
        }
    }

    out
}

/// Render runs as pretty-printed JSON
pub fn render_json(runs: &[PipelineRun]) -> Result<String, PipewrightError> {
    Ok(serde_json::to_string_pretty(runs)?)
}

fn seconds(d: std::time::Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{JobResult, Status, StepResult, StepStatus};
    use crate::filter::{Event, FilterDecision, RunReason, SkipReason, TriggerKind};
    use crate::matrix::{expand, MatrixSpec};
    use std::time::Duration;

    fn failed_run() -> PipelineRun {
        let variant = expand(&MatrixSpec::from_pairs([("os", vec!["20.04"])]))
            .unwrap()
            .remove(0);
        let job = JobResult {
            variant,
            steps: vec![
                StepResult {
                    step: "install".into(),
                    index: 0,
                    status: StepStatus::Succeeded,
                    duration: Duration::from_millis(10),
                    stderr_tail: None,
                },
                StepResult {
                    step: "test".into(),
                    index: 1,
                    status: StepStatus::Failed { exit_code: 2 },
                    duration: Duration::from_millis(10),
                    stderr_tail: Some("assertion failed".into()),
                },
            ],
            status: Status::Failed,
            duration: Duration::from_millis(20),
        };

        PipelineRun::completed(
            "build",
            Event::new(TriggerKind::Push, ["src/app.py"]),
            FilterDecision::Run {
                reason: RunReason::RelevantChange {
                    path: "src/app.py".into(),
                },
            },
            vec![job],
            Duration::from_millis(25),
        )
    }

    #[test]
    fn test_text_report_lists_steps() {
        colored::control::set_override(false);
        let text = render_text(&failed_run());

        assert!(text.starts_with("✗ build  failed"));
        assert!(text.contains("filter: run: 'src/app.py' changed"));
        assert!(text.contains("✓ install"));
        assert!(text.contains("✗ test  exited 2"));
        assert!(text.contains("| assertion failed"));
    }

    #[test]
    fn test_text_report_for_skipped_run() {
        colored::control::set_override(false);
        let run = PipelineRun::skipped(
            "build",
            Event::new(TriggerKind::Push, ["docs/readme.md"]),
            FilterDecision::Skip {
                reason: SkipReason::AllPathsExcluded { paths: 1 },
            },
        );

        let text = render_text(&run);
        assert!(text.starts_with("○ build  skipped"));
        assert!(text.contains("all 1 changed path(s) excluded"));
    }

    #[test]
    fn test_json_report_shape() {
        let json = render_json(&[failed_run()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let run = &value[0];
        assert_eq!(run["status"], "failed");
        assert_eq!(run["decision"]["decision"], "run");
        assert_eq!(run["jobs"][0]["variant"]["values"]["os"], "20.04");
        assert_eq!(run["jobs"][0]["steps"][1]["status"]["kind"], "failed");
        assert_eq!(run["jobs"][0]["steps"][1]["status"]["exit_code"], 2);
        assert_eq!(run["jobs"][0]["steps"][1]["duration_ms"], 10);
    }
}
