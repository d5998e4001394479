// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Trigger events and path filtering
//!
//! Decides from a pipeline's exclusion globs and an event's changed paths
//! whether the event should start a run. The run is skipped only when every
//! changed path is excluded; an event with no known changes always runs.

mod git;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::ConfigError;

/// Kind of repository event that can start a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Push,
    PullRequest,
}

impl TriggerKind {
    /// Both trigger kinds, the default for a pipeline that doesn't say
    pub fn all() -> Vec<Self> {
        vec![Self::Push, Self::PullRequest]
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::PullRequest => write!(f, "pull_request"),
        }
    }
}

impl std::str::FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "push" => Ok(Self::Push),
            "pull_request" | "pr" => Ok(Self::PullRequest),
            _ => Err(format!("Unknown event kind: {}", s)),
        }
    }
}

/// A repository event: what happened and which paths it touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: TriggerKind,
    /// Normalised, de-duplicated changed paths. Empty means the diff is unknown.
    pub changed_paths: BTreeSet<String>,
}

impl Event {
    /// Create an event, normalising every path
    pub fn new<I, S>(kind: TriggerKind, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let changed_paths = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();

        Self { kind, changed_paths }
    }

    /// Whether the set of changed paths is unknown
    pub fn diff_unknown(&self) -> bool {
        self.changed_paths.is_empty()
    }
}

/// Normalise a path for matching: forward slashes, no leading `./`
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

/// Exclusion globs compiled once at load time
#[derive(Debug, Clone, Default)]
pub struct FilterRule {
    patterns: Vec<Pattern>,
}

impl FilterRule {
    /// Compile exclusion patterns, rejecting any that are malformed
    pub fn new<S: AsRef<str>>(pipeline: &str, exclusions: &[S]) -> Result<Self, ConfigError> {
        let patterns = exclusions
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                Pattern::new(&normalize_path(raw)).map_err(|e| ConfigError::InvalidGlob {
                    pipeline: pipeline.to_string(),
                    pattern: raw.to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Exclusion patterns in declared order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a changed path matches any exclusion
    pub fn excludes(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.patterns
            .iter()
            .any(|p| p.matches_with(&path, match_options()))
    }

    /// Evaluate an event against this rule
    pub fn evaluate(&self, event: &Event) -> FilterDecision {
        if event.diff_unknown() {
            return FilterDecision::Run {
                reason: RunReason::UnknownDiff,
            };
        }

        match event.changed_paths.iter().find(|p| !self.excludes(p)) {
            Some(path) => FilterDecision::Run {
                reason: RunReason::RelevantChange { path: path.clone() },
            },
            None => FilterDecision::Skip {
                reason: SkipReason::AllPathsExcluded {
                    paths: event.changed_paths.len(),
                },
            },
        }
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Whether an event should produce a run under the given rule
pub fn should_run(event: &Event, rule: &FilterRule) -> bool {
    rule.evaluate(event).triggered()
}

/// Outcome of filtering an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum FilterDecision {
    Run { reason: RunReason },
    Skip { reason: SkipReason },
}

impl FilterDecision {
    pub fn triggered(&self) -> bool {
        matches!(self, Self::Run { .. })
    }
}

impl std::fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run { reason } => write!(f, "run: {}", reason),
            Self::Skip { reason } => write!(f, "skip: {}", reason),
        }
    }
}

/// Why an event triggered a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunReason {
    /// No changed paths were supplied
    UnknownDiff,
    /// First changed path (in sorted order) not covered by an exclusion
    RelevantChange { path: String },
}

impl std::fmt::Display for RunReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDiff => write!(f, "changed paths unknown"),
            Self::RelevantChange { path } => write!(f, "'{}' changed", path),
        }
    }
}

/// Why an event did not trigger a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    AllPathsExcluded { paths: usize },
    TriggerNotEnabled { trigger: TriggerKind },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllPathsExcluded { paths } => {
                write!(f, "all {} changed path(s) excluded", paths)
            }
            Self::TriggerNotEnabled { trigger } => {
                write!(f, "pipeline does not run on {}", trigger)
            }
        }
    }
}
