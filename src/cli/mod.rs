// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipewright.

pub mod init;
pub mod matrix;
pub mod run;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::errors::{PipewrightError, RecoverySuggestion};
use crate::pipeline::{compile_file, Pipeline, PipelineFile, DEFAULT_PIPELINE_FILE};

/// CI pipeline orchestrator
///
/// Filter events by changed paths, expand job matrices, and run steps.
#[derive(Parser, Debug)]
#[clap(
    name = "pipewright",
    version,
    about = "Run CI pipelines locally: path filters, job matrices, fail-fast scheduling",
    long_about = None,
    after_help = "Examples:\n\
        pipewright init                          Write a starter .pipewright.yaml\n\
        pipewright validate                      Check the pipeline file\n\
        pipewright matrix                        List the expanded job variants\n\
        pipewright run --since origin/main       Run pipelines for changes since a revision\n\
        pipewright watch                         Re-run pipelines when files change\n\n\
        See 'pipewright <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter pipeline file
    Init {
        /// Overwrite an existing pipeline file
        #[clap(long)]
        force: bool,
    },

    /// Run pipelines for an event
    Run(run::RunArgs),

    /// Watch mode - run pipelines for every batch of file changes
    Watch {
        /// Pipeline file
        #[clap(short, long, default_value = DEFAULT_PIPELINE_FILE)]
        file: PathBuf,

        /// Run only the named pipelines
        #[clap(short, long = "pipeline", value_name = "NAME")]
        pipelines: Vec<String>,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "500")]
        debounce: u64,
    },

    /// Validate pipeline configuration
    Validate {
        /// Pipeline file to validate
        #[clap(default_value = DEFAULT_PIPELINE_FILE)]
        file: PathBuf,
    },

    /// Show the job variants each pipeline expands to
    Matrix {
        /// Pipeline file
        #[clap(default_value = DEFAULT_PIPELINE_FILE)]
        file: PathBuf,

        /// Show only the named pipelines
        #[clap(short, long = "pipeline", value_name = "NAME")]
        pipelines: Vec<String>,
    },
}

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Load a pipeline file and compile the selected pipelines
///
/// An empty selection means every pipeline in the file.
pub(crate) fn load_pipelines(
    path: &Path,
    selected: &[String],
) -> Result<Vec<Pipeline>, PipewrightError> {
    let file = PipelineFile::from_file(path)?;

    for name in selected {
        if file.get(name).is_none() {
            return Err(PipewrightError::unknown_pipeline(name, &file.names()));
        }
    }

    let pipelines = compile_file(&file).map_err(|e| {
        eprintln!("{}", RecoverySuggestion::for_config_error(&e).format());
        PipewrightError::from(e)
    })?;

    Ok(pipelines
        .into_iter()
        .filter(|p| selected.is_empty() || selected.contains(&p.name))
        .collect())
}
