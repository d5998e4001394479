// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Progress spinner utilities
//!
//! Provides progress indicators while pipelines run.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::colors::status_glyph;
use crate::pipeline::PipelineRun;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A spinner that is only drawn when `enabled`
pub fn pipeline_spinner(pipeline: &str, enabled: bool) -> ProgressBar {
    if enabled {
        create_spinner(&format!("Running pipeline '{}'...", pipeline))
    } else {
        ProgressBar::hidden()
    }
}

/// Replace the spinner with a one-line summary of the run
pub fn finish_spinner(pb: &ProgressBar, run: &PipelineRun) {
    pb.finish_and_clear();
    if !pb.is_hidden() {
        eprintln!(
            "{} {} ({} job(s), {:.1}s)",
            status_glyph(run.status),
            run.pipeline,
            run.jobs.len(),
            run.duration.as_secs_f64()
        );
    }
}
