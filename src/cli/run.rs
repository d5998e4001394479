// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Run command - run pipelines for one event

use clap::Args;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::{load_pipelines, OutputFormat};
use crate::engine::Status;
use crate::executors::{CommandExecutor, DryRunExecutor, ShellExecutor};
use crate::filter::{Event, TriggerKind};
use crate::pipeline::{Pipeline, PipelineOrchestrator, DEFAULT_PIPELINE_FILE};
use crate::report::{render_json, render_text};
use crate::utils::{finish_spinner, pipeline_spinner};

/// Arguments for `pipewright run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline file
    #[clap(short, long, default_value = DEFAULT_PIPELINE_FILE)]
    pub file: PathBuf,

    /// Run only the named pipelines
    #[clap(short, long = "pipeline", value_name = "NAME")]
    pub pipelines: Vec<String>,

    /// Event kind (push, pull_request)
    #[clap(short, long, default_value = "push")]
    pub event: TriggerKind,

    /// A changed path; repeat for several. None means the diff is unknown.
    #[clap(long, value_name = "PATH")]
    pub changed: Vec<String>,

    /// Take changed paths from `git diff --name-only <REV>`
    #[clap(long, value_name = "REV", conflicts_with = "changed")]
    pub since: Option<String>,

    /// Show what would run without running it
    #[clap(long)]
    pub dry_run: bool,

    /// Output format (text, json)
    #[clap(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Run the run command
pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let pipelines = load_pipelines(&args.file, &args.pipelines)?;

    let working_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let event = match &args.since {
        Some(rev) => Event::from_git_diff(args.event, rev, &working_dir).await?,
        None => Event::new(args.event, &args.changed),
    };

    if verbose {
        eprintln!(
            "{} {} event, {} changed path(s)",
            "→".blue(),
            event.kind,
            event.changed_paths.len()
        );
    }

    let executor: Arc<dyn CommandExecutor> = if args.dry_run {
        Arc::new(DryRunExecutor::new())
    } else {
        Arc::new(ShellExecutor::new())
    };

    let missing = missing_shells(executor.as_ref(), &pipelines).await;
    if !missing.is_empty() {
        eprintln!("{}", "Missing required shells:".red().bold());
        for shell in &missing {
            eprintln!("  {} {}", "✗".red(), shell);
        }
        return Err(miette::miette!("Required shells are not installed"));
    }

    let orchestrator = PipelineOrchestrator::new(executor, &working_dir);
    let mut runs = Vec::with_capacity(pipelines.len());

    for pipeline in &pipelines {
        let spinner = pipeline_spinner(&pipeline.name, args.format == OutputFormat::Text);
        let run = orchestrator.run(&event, pipeline).await?;
        finish_spinner(&spinner, &run);
        runs.push(run);
    }

    match args.format {
        OutputFormat::Text => {
            for run in &runs {
                println!("{}", render_text(run));
            }
        }
        OutputFormat::Json => println!("{}", render_json(&runs)?),
    }

    let failed: Vec<_> = runs
        .iter()
        .filter(|r| r.status == Status::Failed)
        .map(|r| r.pipeline.as_str())
        .collect();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!("Pipeline(s) failed: {}", failed.join(", ")))
    }
}

/// Shells named by any step that the executor cannot use
async fn missing_shells(executor: &dyn CommandExecutor, pipelines: &[Pipeline]) -> Vec<String> {
    let shells: BTreeSet<&str> = pipelines
        .iter()
        .flat_map(|p| p.steps.iter().map(|s| s.shell.as_str()))
        .collect();

    let mut missing = Vec::new();
    for shell in shells {
        if !executor.check_available(shell).await {
            missing.push(shell.to_string());
        }
    }
    missing
}
