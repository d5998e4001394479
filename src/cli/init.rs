// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Init command - write a starter pipeline file

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::pipeline::DEFAULT_PIPELINE_FILE;
use crate::utils::colors::{print_header, print_info, print_success};

/// Run the init command
pub async fn run(force: bool, verbose: bool) -> Result<()> {
    print_header("Initializing pipewright...");
    println!();

    let path = Path::new(DEFAULT_PIPELINE_FILE);
    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            DEFAULT_PIPELINE_FILE
        ));
    }

    std::fs::write(path, starter_pipelines()).map_err(|e| {
        miette::miette!("Failed to write {}: {}", DEFAULT_PIPELINE_FILE, e)
    })?;

    print_success(&format!("Created {}", DEFAULT_PIPELINE_FILE));
    println!();
    println!("Next steps:");
    println!("  1. Replace the example commands in {}", DEFAULT_PIPELINE_FILE.cyan());
    println!("  2. Run {} to see the job matrix", "pipewright matrix".cyan());
    println!(
        "  3. Run {} to run pipelines for your changes",
        "pipewright run --since HEAD".cyan()
    );
    println!();

    if verbose {
        println!("{}", "Generated pipelines:".bold());
        print_info("build - 2×2 matrix, runs every variant to completion");
        print_info("lint  - pull requests only, fail-fast across linters");
        println!();
    }

    Ok(())
}

/// A build-matrix pipeline and a lint pipeline with separate exclusion lists
fn starter_pipelines() -> String {
    r#"# pipewright pipeline definitions
version: "1"

pipelines:
  - name: build
    description: Build and test on every platform and interpreter version
    on: [push, pull_request]
    paths_ignore:
      - "**/*.md"
      - "docs/**"
    matrix:
      os: ["18.04", "20.04"]
      python: ["2.7", "3.7"]
    fail_fast: false
    steps:
      - name: install
        run: echo "install dependencies for python ${{ matrix.python }} on $MATRIX_OS"
      - name: test
        run: echo "run the test suite"
      - name: cleanup
        run: echo "remove build artifacts"
        always: true

  - name: lint
    description: Static checks
    on: [pull_request]
    paths_ignore:
      - "docs/**"
      - "tests/fixtures/**"
    matrix:
      linter: ["flake8", "mypy"]
    fail_fast: true
    steps:
      - name: lint
        run: echo "run ${{ matrix.linter }}"
"#
    .to_string()
}
