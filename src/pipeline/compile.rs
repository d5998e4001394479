// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Compiled pipelines
//!
//! A [`PipelineDefinition`] is what the YAML says. A [`Pipeline`] is the same
//! thing after every semantic check has passed: globs compiled, matrix
//! checked, steps checked. Nothing that fails here can fail later at run time.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::definition::{PipelineDefinition, PipelineFile, Step};
use crate::engine::SchedulePolicy;
use crate::errors::ConfigError;
use crate::filter::{Event, FilterDecision, FilterRule, SkipReason, TriggerKind};
use crate::matrix::{expand, JobVariant, MatrixSpec};

/// A validated pipeline, ready to run
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    pub description: Option<String>,
    pub triggers: Vec<TriggerKind>,
    pub filter: FilterRule,
    pub matrix: MatrixSpec,
    pub steps: Arc<[Step]>,
    pub env: BTreeMap<String, String>,
    pub policy: SchedulePolicy,
}

impl Pipeline {
    /// Check a definition and compile it
    pub fn compile(def: &PipelineDefinition) -> Result<Self, ConfigError> {
        let name = def.name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidPipeline {
                reason: "pipeline name is empty".into(),
            });
        }

        let filter = FilterRule::new(name, def.paths_ignore.as_slice())?;
        def.matrix.validate(name)?;
        if expand(&def.matrix)
            .map_err(|e| e.with_pipeline(name))?
            .is_empty()
        {
            return Err(ConfigError::EmptyMatrix {
                pipeline: name.to_string(),
            });
        }
        check_steps(name, &def.steps)?;

        if def.max_parallel == Some(0) {
            return Err(ConfigError::InvalidParallelism {
                pipeline: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            description: def.description.clone(),
            triggers: def.on.clone(),
            filter,
            matrix: def.matrix.clone(),
            steps: Arc::from(def.steps.clone()),
            env: def.env.clone(),
            policy: SchedulePolicy {
                fail_fast: def.fail_fast,
                max_parallel: def.max_parallel,
            },
        })
    }

    /// Decide whether an event starts this pipeline
    pub fn decide(&self, event: &Event) -> FilterDecision {
        if !self.triggers.contains(&event.kind) {
            return FilterDecision::Skip {
                reason: SkipReason::TriggerNotEnabled {
                    trigger: event.kind,
                },
            };
        }
        self.filter.evaluate(event)
    }

    /// Expand the matrix into job variants
    pub fn variants(&self) -> Result<Vec<JobVariant>, ConfigError> {
        expand(&self.matrix).map_err(|e| e.with_pipeline(&self.name))
    }
}

fn check_steps(pipeline: &str, steps: &[Step]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for step in steps {
        let invalid = |reason: &str| ConfigError::InvalidStep {
            pipeline: pipeline.to_string(),
            step: step.name.clone(),
            reason: reason.to_string(),
        };

        if step.name.trim().is_empty() {
            return Err(invalid("step name is empty"));
        }
        if step.run.trim().is_empty() {
            return Err(invalid("command is empty"));
        }
        if step.shell.trim().is_empty() {
            return Err(invalid("shell is empty"));
        }
        if step.timeout_secs == Some(0) {
            return Err(invalid("timeout_secs must be at least 1"));
        }
        if !seen.insert(step.name.as_str()) {
            return Err(ConfigError::DuplicateStep {
                pipeline: pipeline.to_string(),
                step: step.name.clone(),
            });
        }
    }

    Ok(())
}

/// Compile every pipeline in a file
pub fn compile_file(file: &PipelineFile) -> Result<Vec<Pipeline>, ConfigError> {
    let mut seen = HashSet::new();

    file.pipelines
        .iter()
        .map(|def| {
            if !seen.insert(def.name.trim()) {
                return Err(ConfigError::DuplicatePipeline {
                    pipeline: def.name.trim().to_string(),
                });
            }
            Pipeline::compile(def)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(yaml: &str) -> PipelineDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_compile_valid_pipeline() {
        let def = definition(
            r#"
name: build
paths_ignore: ["**/*.md"]
matrix:
  os: ["18.04", "20.04"]
steps:
  - name: test
    run: make test
max_parallel: 2
"#,
        );

        let pipeline = Pipeline::compile(&def).unwrap();
        assert_eq!(pipeline.name, "build");
        assert_eq!(pipeline.variants().unwrap().len(), 2);
        assert_eq!(pipeline.policy.max_parallel, Some(2));
        assert!(!pipeline.policy.fail_fast);
    }

    #[test]
    fn test_invalid_glob_rejected_at_load() {
        let def = definition("name: build\npaths_ignore: [\"docs/[\"]\n");
        let err = Pipeline::compile(&def).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
        assert_eq!(err.pipeline(), Some("build"));
    }

    #[test]
    fn test_empty_dimension_rejected_at_load() {
        let def = definition("name: build\nmatrix:\n  os: []\n");
        let err = Pipeline::compile(&def).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyDimension {
                pipeline: "build".into(),
                dimension: "os".into(),
            }
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        let def = definition("name: build\nsteps:\n  - name: noop\n    run: \"  \"\n");
        assert!(matches!(
            Pipeline::compile(&def),
            Err(ConfigError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let def = definition(
            "name: build\nsteps:\n  - name: a\n    run: x\n  - name: a\n    run: y\n",
        );
        assert!(matches!(
            Pipeline::compile(&def),
            Err(ConfigError::DuplicateStep { .. })
        ));
    }

    #[test]
    fn test_matrix_excluding_every_job_rejected() {
        let def = definition(
            r#"
name: build
matrix:
  os: ["linux"]
  exclude:
    - os: "linux"
steps:
  - name: test
    run: "false"
"#,
        );
        assert_eq!(
            Pipeline::compile(&def).unwrap_err(),
            ConfigError::EmptyMatrix {
                pipeline: "build".into()
            }
        );
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let def = definition("name: build\nmax_parallel: 0\n");
        assert!(matches!(
            Pipeline::compile(&def),
            Err(ConfigError::InvalidParallelism { .. })
        ));
    }

    #[test]
    fn test_duplicate_pipeline_names() {
        let file = PipelineFile::from_yaml(
            "pipelines:\n  - name: lint\n  - name: lint\n",
        )
        .unwrap();
        assert_eq!(
            compile_file(&file).unwrap_err(),
            ConfigError::DuplicatePipeline {
                pipeline: "lint".into()
            }
        );
    }

    #[test]
    fn test_duplicate_pipeline_names_ignore_padding() {
        let file = PipelineFile::from_yaml(
            "pipelines:\n  - name: lint\n  - name: \" lint\"\n",
        )
        .unwrap();
        assert_eq!(
            compile_file(&file).unwrap_err(),
            ConfigError::DuplicatePipeline {
                pipeline: "lint".into()
            }
        );
    }

    #[test]
    fn test_trigger_checked_before_paths() {
        let def = definition("name: lint\non: [pull_request]\n");
        let pipeline = Pipeline::compile(&def).unwrap();

        let push = Event::new(TriggerKind::Push, ["src/main.rs"]);
        assert_eq!(
            pipeline.decide(&push),
            FilterDecision::Skip {
                reason: SkipReason::TriggerNotEnabled {
                    trigger: TriggerKind::Push
                }
            }
        );

        let pr = Event::new(TriggerKind::PullRequest, ["src/main.rs"]);
        assert!(pipeline.decide(&pr).triggered());
    }
}
