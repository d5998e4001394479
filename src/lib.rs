// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! # pipewright - CI pipeline orchestration
//!
//! `pipewright` decides whether a repository event should run a pipeline,
//! expands the pipeline's job matrix, and runs every job's steps with
//! fail-fast or fail-independent scheduling.
//!
//! ## Features
//!
//! - **Path filtering** - Skip runs when every changed path is excluded
//! - **Job matrices** - Deterministic cross-product with include/exclude
//! - **Ordered steps** - Stop on first failure, always-run cleanup steps
//! - **Concurrent jobs** - Fail-fast cancellation and a parallelism limit
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a starter pipeline file
//! pipewright init
//!
//! # Show the expanded job variants
//! pipewright matrix
//!
//! # Run pipelines for the changes since main
//! pipewright run --since origin/main
//! ```

pub mod cli;
pub mod engine;
pub mod errors;
pub mod executors;
pub mod filter;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use engine::{JobResult, Status, StepResult};
pub use errors::{ConfigError, ExecutionError, PipewrightError, PipewrightResult};
pub use filter::{should_run, Event, FilterRule, TriggerKind};
pub use matrix::{expand, JobVariant, MatrixSpec};
pub use pipeline::{Pipeline, PipelineDefinition, PipelineOrchestrator, PipelineRun};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
