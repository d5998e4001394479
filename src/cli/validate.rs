// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Validate command - check pipeline configuration

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::errors::RecoverySuggestion;
use crate::pipeline::{PipelineFile, PipelineValidator};
use crate::utils::colors::{print_error, print_header, print_info, print_success, print_warning};

/// Run the validate command
pub async fn run(file: PathBuf, verbose: bool) -> Result<()> {
    print_header("Validating pipelines...");
    println!();

    let pipelines = match PipelineFile::from_file(&file) {
        Ok(p) => p,
        Err(e) => {
            print_error(&format!("Failed to parse {}", file.display()));
            println!();
            return Err(e.into());
        }
    };

    print_success("Pipeline file is valid YAML");

    let validation = PipelineValidator::validate(&pipelines);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            print_error(error);
        }

        for error in &validation.config_errors {
            println!();
            println!("{}", RecoverySuggestion::for_config_error(error).format());
        }
    }

    if validation.has_warnings() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        for def in &pipelines.pipelines {
            let triggers: Vec<String> = def.on.iter().map(|t| t.to_string()).collect();
            print_info(&format!(
                "{} ({} step(s), {} job(s)) {}",
                def.name,
                def.steps.len(),
                def.matrix.product_size(),
                format!("[on: {}]", triggers.join(", ")).dimmed()
            ));
        }
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Pipeline validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Pipelines are valid but have warnings.".yellow().bold());
    } else {
        println!("{}", "Pipelines are valid!".green().bold());
    }
    Ok(())
}
