// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for fixing a rejected pipeline definition.

use super::ConfigError;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Example snippet to copy
    pub example: Option<String>,
}

impl RecoverySuggestion {
    /// Suggest a fix for a configuration error
    pub fn for_config_error(error: &ConfigError) -> Self {
        match error {
            ConfigError::InvalidGlob { pattern, .. } => Self {
                action: format!("Fix the path pattern '{}'", pattern),
                steps: vec![
                    "'**' must be a whole path segment, e.g. 'docs/**' or '**/*.md'".into(),
                    "Character classes like '[abc]' must be closed".into(),
                ],
                example: Some("paths_ignore:\n  - \"**/*.md\"\n  - \"docs/**\"".into()),
            },
            ConfigError::EmptyDimension { dimension, .. } => Self {
                action: format!("Give matrix dimension '{}' at least one value", dimension),
                steps: vec![
                    "Every dimension multiplies the number of jobs by its value count".into(),
                    "An empty list would produce zero jobs, which is never intended".into(),
                ],
                example: Some(format!("matrix:\n  {}: [\"a\", \"b\"]", dimension)),
            },
            ConfigError::DuplicateDimension { dimension, .. } => Self {
                action: format!("Merge the two '{}' entries into one list", dimension),
                steps: vec!["Dimension names must be unique within a matrix".into()],
                example: None,
            },
            ConfigError::UnknownDimension {
                section, dimension, ..
            } => Self {
                action: format!("Declare '{}' in the matrix or drop it from {}", dimension, section),
                steps: vec![format!(
                    "Entries under '{}' may only use declared dimension names",
                    section
                )],
                example: None,
            },
            ConfigError::EmptyMatrix { .. } => Self {
                action: "Keep at least one job variant after exclusions".into(),
                steps: vec![
                    "Each 'exclude' entry removes every variant it matches".into(),
                    "An entry naming fewer dimensions matches more variants".into(),
                ],
                example: Some(
                    "matrix:\n  os: [\"linux\", \"macos\"]\n  exclude:\n    - os: \"macos\"".into(),
                ),
            },
            ConfigError::InvalidStep { step, reason, .. } => Self {
                action: format!("Fix step '{}'", step),
                steps: vec![reason.clone()],
                example: Some("steps:\n  - name: test\n    run: make test".into()),
            },
            ConfigError::DuplicateStep { step, .. } => Self {
                action: format!("Rename one of the steps called '{}'", step),
                steps: vec!["Step names identify results in reports and must be unique".into()],
                example: None,
            },
            ConfigError::DuplicatePipeline { pipeline } => Self {
                action: format!("Rename one of the pipelines called '{}'", pipeline),
                steps: vec!["Pipelines are selected by name with --pipeline".into()],
                example: None,
            },
            ConfigError::InvalidParallelism { .. } => Self {
                action: "Set max_parallel to a positive number or remove it".into(),
                steps: vec!["Without max_parallel every job variant runs at once".into()],
                example: Some("max_parallel: 2".into()),
            },
            ConfigError::InvalidPipeline { reason } => Self {
                action: "Fix the pipeline file".into(),
                steps: vec![reason.clone()],
                example: None,
            },
        }
    }

    /// Format for display
    pub fn format(&self) -> String {
        let mut output = format!("To fix: {}\n\n", self.action);

        for step in &self.steps {
            output.push_str(&format!("  • {}\n", step));
        }

        if let Some(ref example) = self.example {
            output.push_str("\nExample:\n");
            for line in example.lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dimension_suggestion() {
        let suggestion = RecoverySuggestion::for_config_error(&ConfigError::EmptyDimension {
            pipeline: "build".into(),
            dimension: "python".into(),
        });

        assert!(suggestion.action.contains("python"));
        assert!(suggestion.format().contains("matrix:"));
    }

    #[test]
    fn test_format_without_example() {
        let suggestion = RecoverySuggestion::for_config_error(&ConfigError::DuplicateStep {
            pipeline: "lint".into(),
            step: "flake8".into(),
        });

        let text = suggestion.format();
        assert!(text.starts_with("To fix: Rename one of the steps called 'flake8'"));
        assert!(!text.contains("Example:"));
    }
}
