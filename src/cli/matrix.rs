// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Matrix command - list the job variants of each pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::load_pipelines;
use crate::engine::matrix_env_name;

/// Run the matrix command
pub async fn run(file: PathBuf, pipelines: Vec<String>, verbose: bool) -> Result<()> {
    for pipeline in load_pipelines(&file, &pipelines)? {
        let variants = pipeline.variants()?;

        println!(
            "{} {}",
            pipeline.name.bold(),
            format!("({} job(s))", variants.len()).dimmed()
        );

        for variant in &variants {
            println!("  [{}] {}", variant.index, variant.label);

            if verbose {
                for (dimension, value) in &variant.values {
                    println!(
                        "        {}",
                        format!("{}={}", matrix_env_name(dimension), value).dimmed()
                    );
                }
            }
        }
        println!();
    }

    Ok(())
}
