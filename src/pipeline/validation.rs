// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Pipeline validation
//!
//! Validates a pipeline file before execution. Errors are everything that
//! would stop the file from compiling; warnings flag definitions that load
//! fine but probably don't do what was meant.

use std::collections::HashSet;

use super::compile::Pipeline;
use super::definition::{PipelineDefinition, PipelineFile};
use crate::errors::ConfigError;

/// Matrices larger than this get a warning
const LARGE_MATRIX: usize = 64;

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate every pipeline in a file
    pub fn validate(file: &PipelineFile) -> ValidationResult {
        let mut result = ValidationResult::new();

        if file.pipelines.is_empty() {
            result.add_error("File defines no pipelines");
        }

        let mut seen = HashSet::new();
        for def in &file.pipelines {
            if !seen.insert(def.name.trim()) {
                result.add_config_error(ConfigError::DuplicatePipeline {
                    pipeline: def.name.trim().to_string(),
                });
                continue;
            }
            Self::validate_definition(def, &mut result);
        }

        result
    }

    /// Validate a single pipeline definition
    fn validate_definition(def: &PipelineDefinition, result: &mut ValidationResult) {
        if let Err(e) = Pipeline::compile(def) {
            result.add_config_error(e);
            return;
        }

        if def.steps.is_empty() {
            result.add_warning(&format!(
                "Pipeline '{}': no steps defined, every job trivially succeeds",
                def.name
            ));
        }

        if def.on.is_empty() {
            result.add_warning(&format!(
                "Pipeline '{}': 'on' is empty, no event will ever run it",
                def.name
            ));
        }

        // A catch-all exclusion turns every event with a known diff into a skip
        if def
            .paths_ignore
            .iter()
            .any(|p| p == "**" || p == "**/*")
        {
            result.add_warning(&format!(
                "Pipeline '{}': paths_ignore matches every path, it only runs when the diff is unknown",
                def.name
            ));
        }

        let size = def.matrix.product_size();
        if size > LARGE_MATRIX {
            result.add_warning(&format!(
                "Pipeline '{}': matrix expands to {} jobs{}",
                def.name,
                size,
                if def.max_parallel.is_none() {
                    ", consider setting max_parallel"
                } else {
                    ""
                }
            ));
        }

        if def.fail_fast && size <= 1 && def.matrix.include.is_empty() {
            result.add_warning(&format!(
                "Pipeline '{}': fail_fast has no effect with a single job",
                def.name
            ));
        }

        let mut kinds = HashSet::new();
        if !def.on.iter().all(|kind| kinds.insert(*kind)) {
            result.add_warning(&format!(
                "Pipeline '{}': 'on' lists an event kind more than once",
                def.name
            ));
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Structured form of the errors that came from compilation
    pub config_errors: Vec<ConfigError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_config_error(&mut self, error: ConfigError) {
        self.errors.push(error.to_string());
        self.config_errors.push(error);
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
