// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Binding matrix values into step commands and environments

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::matrix::JobVariant;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{\{\s*matrix\.([A-Za-z0-9_-]+)\s*\}\}").expect("Invalid placeholder regex")
    })
}

/// Replace `${{ matrix.<dim> }}` with the variant's value
///
/// Placeholders naming an unknown dimension are left untouched.
pub fn interpolate(text: &str, variant: &JobVariant) -> String {
    placeholder()
        .replace_all(text, |caps: &Captures| match variant.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Environment variable name for a matrix dimension: `python-version` → `MATRIX_PYTHON_VERSION`
pub fn matrix_env_name(dimension: &str) -> String {
    let upper: String = dimension
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("MATRIX_{}", upper)
}
