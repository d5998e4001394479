// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline definitions and orchestration
//!
//! This module defines the pipeline file schema, compiles definitions into
//! runnable pipelines, and drives a pipeline from an event to its result.

mod compile;
mod definition;
mod orchestrator;
mod run;
mod validation;

pub use compile::{compile_file, Pipeline};
pub use definition::*;
pub use orchestrator::PipelineOrchestrator;
pub use run::PipelineRun;
pub use validation::{PipelineValidator, ValidationResult};
