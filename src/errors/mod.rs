// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Error types
//!
//! Three families of failure exist. [`ConfigError`] is raised while a pipeline
//! definition is loaded and compiled, before anything runs. [`ExecutionError`]
//! describes a step whose command could not be launched or was terminated; it
//! is captured into the job result and never escapes the step executor.
//! [`PipewrightError`] is the umbrella type for everything the CLI surfaces.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipewright operations
pub type PipewrightResult<T> = Result<T, PipewrightError>;

/// Errors detected while loading a pipeline definition
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Pipeline '{pipeline}': invalid path pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(pipewright::invalid_glob),
        help("Patterns support '*' within a segment and '**' as a whole path segment")
    )]
    InvalidGlob {
        pipeline: String,
        pattern: String,
        reason: String,
    },

    #[error("Pipeline '{pipeline}': matrix dimension '{dimension}' has no values")]
    #[diagnostic(
        code(pipewright::empty_dimension),
        help("Give '{dimension}' at least one value or remove it from the matrix")
    )]
    EmptyDimension { pipeline: String, dimension: String },

    #[error("Pipeline '{pipeline}': matrix dimension '{dimension}' is declared twice")]
    #[diagnostic(code(pipewright::duplicate_dimension))]
    DuplicateDimension { pipeline: String, dimension: String },

    #[error("Pipeline '{pipeline}': matrix {section} references unknown dimension '{dimension}'")]
    #[diagnostic(code(pipewright::unknown_dimension))]
    UnknownDimension {
        pipeline: String,
        section: String,
        dimension: String,
    },

    #[error("Pipeline '{pipeline}': matrix exclusions remove every job")]
    #[diagnostic(
        code(pipewright::empty_matrix),
        help("Narrow the 'exclude' entries or add an 'include' entry")
    )]
    EmptyMatrix { pipeline: String },

    #[error("Pipeline '{pipeline}': step '{step}' is invalid: {reason}")]
    #[diagnostic(code(pipewright::invalid_step))]
    InvalidStep {
        pipeline: String,
        step: String,
        reason: String,
    },

    #[error("Pipeline '{pipeline}': step name '{step}' is used more than once")]
    #[diagnostic(code(pipewright::duplicate_step))]
    DuplicateStep { pipeline: String, step: String },

    #[error("Pipeline name '{pipeline}' is used more than once")]
    #[diagnostic(code(pipewright::duplicate_pipeline))]
    DuplicatePipeline { pipeline: String },

    #[error("Pipeline '{pipeline}': max_parallel must be at least 1")]
    #[diagnostic(code(pipewright::invalid_parallelism))]
    InvalidParallelism { pipeline: String },

    #[error("Pipeline definition is invalid: {reason}")]
    #[diagnostic(code(pipewright::invalid_pipeline))]
    InvalidPipeline { reason: String },
}

impl ConfigError {
    /// Name of the pipeline the error belongs to, if any
    pub fn pipeline(&self) -> Option<&str> {
        match self {
            Self::InvalidGlob { pipeline, .. }
            | Self::EmptyDimension { pipeline, .. }
            | Self::DuplicateDimension { pipeline, .. }
            | Self::UnknownDimension { pipeline, .. }
            | Self::EmptyMatrix { pipeline }
            | Self::InvalidStep { pipeline, .. }
            | Self::DuplicateStep { pipeline, .. }
            | Self::DuplicatePipeline { pipeline }
            | Self::InvalidParallelism { pipeline } => Some(pipeline),
            Self::InvalidPipeline { .. } => None,
        }
    }

    /// Attach a pipeline name to an error raised without one
    pub fn with_pipeline(mut self, name: &str) -> Self {
        match &mut self {
            Self::InvalidGlob { pipeline, .. }
            | Self::EmptyDimension { pipeline, .. }
            | Self::DuplicateDimension { pipeline, .. }
            | Self::UnknownDimension { pipeline, .. }
            | Self::EmptyMatrix { pipeline }
            | Self::InvalidStep { pipeline, .. }
            | Self::DuplicateStep { pipeline, .. }
            | Self::DuplicatePipeline { pipeline }
            | Self::InvalidParallelism { pipeline }
                if pipeline.is_empty() =>
            {
                *pipeline = name.to_string();
            }
            _ => {}
        }
        self
    }
}

/// A step command that could not run to a normal exit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("command interpreter '{program}' not found")]
    NotFound { program: String },

    #[error("failed to launch command: {message}")]
    Spawn { message: String },

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("terminated by signal")]
    Killed,

    #[error("cancelled")]
    Cancelled,
}

impl ExecutionError {
    /// Whether the error was caused by a fail-fast cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Main error type for pipewright
#[derive(Error, Debug, Diagnostic)]
pub enum PipewrightError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Pipeline file not found: {path}")]
    #[diagnostic(
        code(pipewright::pipeline_not_found),
        help("Create one with 'pipewright init' or pass --file")
    )]
    PipelineNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipewright::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("No pipeline named '{name}'")]
    #[diagnostic(code(pipewright::unknown_pipeline))]
    UnknownPipeline {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("Could not determine changed paths: {message}")]
    #[diagnostic(code(pipewright::event_source))]
    EventSource { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(pipewright::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipewright::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(pipewright::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for PipewrightError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for PipewrightError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipewrightError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl PipewrightError {
    /// Create an unknown pipeline error listing the names that do exist
    pub fn unknown_pipeline(name: &str, available: &[&str]) -> Self {
        let help = if available.is_empty() {
            None
        } else {
            Some(format!("Available pipelines: {}", available.join(", ")))
        };

        Self::UnknownPipeline {
            name: name.to_string(),
            help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_pipeline() {
        let err = ConfigError::EmptyDimension {
            pipeline: "build".into(),
            dimension: "os".into(),
        };
        assert_eq!(err.pipeline(), Some("build"));
        assert!(err.to_string().contains("'os' has no values"));
    }

    #[test]
    fn test_with_pipeline_fills_blank_name() {
        let err = ConfigError::EmptyDimension {
            pipeline: String::new(),
            dimension: "py".into(),
        }
        .with_pipeline("build");
        assert_eq!(err.pipeline(), Some("build"));

        let named = ConfigError::InvalidParallelism {
            pipeline: "lint".into(),
        }
        .with_pipeline("build");
        assert_eq!(named.pipeline(), Some("lint"));
    }

    #[test]
    fn test_unknown_pipeline_lists_available() {
        let err = PipewrightError::unknown_pipeline("deploy", &["build", "lint"]);
        match err {
            PipewrightError::UnknownPipeline { help, .. } => {
                assert_eq!(help.as_deref(), Some("Available pipelines: build, lint"));
            }
            _ => panic!("Expected UnknownPipeline"),
        }
    }

    #[test]
    fn test_cancellation_is_distinguished() {
        assert!(ExecutionError::Cancelled.is_cancellation());
        assert!(!ExecutionError::Killed.is_cancellation());
    }
}
