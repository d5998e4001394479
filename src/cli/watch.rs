// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Watch command - run pipelines for every batch of file changes

use colored::Colorize;
use miette::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Duration;

use super::load_pipelines;
use crate::executors::ShellExecutor;
use crate::filter::{Event, TriggerKind};
use crate::pipeline::PipelineOrchestrator;
use crate::report::render_text;

/// Run the watch command
pub async fn run(file: PathBuf, pipelines: Vec<String>, debounce_ms: u64, verbose: bool) -> Result<()> {
    // Fail early on a broken file; later reloads only report errors
    load_pipelines(&file, &pipelines)?;

    let root = std::env::current_dir()
        .and_then(|d| d.canonicalize())
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    println!("{}", "Starting watch mode...".bold());
    println!("Watching for changes (debounce: {}ms)", debounce_ms);
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| miette::miette!("Failed to start watching: {}", e))?;

    // Initial run with an unknown diff runs every pipeline
    run_pipelines(&file, &pipelines, &root, Event::new(TriggerKind::Push, Vec::<String>::new())).await;
    settle(&rx, debounce_ms).await;

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<String> = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .filter_map(|e| relative_path(&root, &e.path))
                    .filter(|p| !p.starts_with(".git/"))
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                println!();
                println!("{}", "─".repeat(50).dimmed());
                println!(
                    "{}: {} file(s) changed",
                    "Change detected".yellow(),
                    changed.len()
                );

                if verbose {
                    for path in &changed {
                        println!("  {}", path);
                    }
                }

                println!();
                run_pipelines(&file, &pipelines, &root, Event::new(TriggerKind::Push, &changed)).await;
                settle(&rx, debounce_ms).await;
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                // Channel closed
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// Drop changes made by the run itself, such as build output
async fn settle<T>(rx: &Receiver<T>, debounce_ms: u64) {
    tokio::time::sleep(Duration::from_millis(debounce_ms)).await;
    let dropped = discard_pending(rx);
    if dropped > 0 {
        tracing::debug!(batches = dropped, "ignored changes made during the run");
    }
}

fn discard_pending<T>(rx: &Receiver<T>) -> usize {
    rx.try_iter().count()
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
}

async fn run_pipelines(file: &Path, selected: &[String], root: &Path, event: Event) {
    // Reload so edits to the pipeline file apply to the next run
    let pipelines = match load_pipelines(file, selected) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", "Failed to load pipelines".red(), e);
            return;
        }
    };

    let orchestrator = PipelineOrchestrator::new(Arc::new(ShellExecutor::new()), root);

    for pipeline in &pipelines {
        match orchestrator.run(&event, pipeline).await {
            Ok(run) => println!("{}", render_text(&run)),
            Err(e) => eprintln!("{}: {}", "Pipeline configuration error".red(), e),
        }
    }
}
