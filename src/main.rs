// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! pipewright - CI pipeline orchestrator
//!
//! Filter events by changed paths, expand job matrices, and run steps.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipewright::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pipewright=debug"
    } else {
        "pipewright=info"
    };

    // Initialize tracing; stdout is reserved for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { force } => pipewright::cli::init::run(force, cli.verbose).await,
        Commands::Run(args) => pipewright::cli::run::run(args, cli.verbose).await,
        Commands::Watch {
            file,
            pipelines,
            debounce,
        } => pipewright::cli::watch::run(file, pipelines, debounce, cli.verbose).await,
        Commands::Validate { file } => pipewright::cli::validate::run(file, cli.verbose).await,
        Commands::Matrix { file, pipelines } => {
            pipewright::cli::matrix::run(file, pipelines, cli.verbose).await
        }
    }
}
