// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline definition structures
//!
//! Defines the schema for .pipewright.yaml files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::PipewrightError;
use crate::filter::TriggerKind;
use crate::matrix::MatrixSpec;

/// Default pipeline file name
pub const DEFAULT_PIPELINE_FILE: &str = ".pipewright.yaml";

/// Contents of a pipeline file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFile {
    /// File format version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Independent pipelines sharing the file
    pub pipelines: Vec<PipelineDefinition>,
}

fn default_version() -> String {
    "1".to_string()
}

impl PipelineFile {
    /// Load a pipeline file from disk
    pub fn from_file(path: &Path) -> Result<Self, PipewrightError> {
        if !path.exists() {
            return Err(PipewrightError::PipelineNotFound {
                path: path.to_path_buf(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| PipewrightError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Parse a pipeline file from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, PipewrightError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, PipewrightError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get a pipeline by name
    pub fn get(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// All pipeline names in declared order
    pub fn names(&self) -> Vec<&str> {
        self.pipelines.iter().map(|p| p.name.as_str()).collect()
    }
}

/// One pipeline: filter rule, matrix, steps and policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name (unique within the file)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event kinds the pipeline reacts to
    #[serde(default = "TriggerKind::all")]
    pub on: Vec<TriggerKind>,

    /// Changed paths matching any of these globs don't trigger a run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths_ignore: Vec<String>,

    /// Job matrix; absent means a single job
    #[serde(default)]
    pub matrix: MatrixSpec,

    /// Steps run in order by every job
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Environment shared by every step
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Cancel remaining jobs as soon as one fails
    #[serde(default)]
    pub fail_fast: bool,

    /// Maximum number of jobs running at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,
}

/// A single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step name (unique within the pipeline)
    pub name: String,

    /// Command text handed to the shell
    pub run: String,

    /// Directory relative to the pipeline root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,

    /// Run even after an earlier step failed (cleanup)
    #[serde(default, skip_serializing_if = "is_false")]
    pub always: bool,

    /// Environment for this step only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Shell to use (bash, sh, etc.)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Terminate the command after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_shell() -> String {
    "bash".to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Step {
    /// A step with default settings
    pub fn new(name: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: run.into(),
            working_directory: None,
            always: false,
            env: BTreeMap::new(),
            shell: default_shell(),
            timeout_secs: None,
        }
    }

    /// Mark the step as always-run
    pub fn always(mut self) -> Self {
        self.always = true;
        self
    }
}
