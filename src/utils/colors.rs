// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Terminal color utilities
//!
//! Provides consistent color schemes and status glyphs across the CLI.

use colored::{ColoredString, Colorize};

use crate::engine::{Status, StepStatus};

/// Glyph for a job or pipeline status
pub fn status_glyph(status: Status) -> ColoredString {
    match status {
        Status::Success => "✓".green(),
        Status::Failed => "✗".red(),
        Status::Skipped => "○".dimmed(),
    }
}

/// Glyph for a step status
pub fn step_glyph(status: &StepStatus) -> ColoredString {
    match status {
        StepStatus::Succeeded => "✓".green(),
        StepStatus::Failed { .. } => "✗".red(),
        StepStatus::Errored { .. } => "!".red().bold(),
        StepStatus::Cancelled => "○".dimmed(),
    }
}

/// Status word colored to match its glyph
pub fn status_word(status: Status) -> ColoredString {
    let word = status.to_string();
    match status {
        Status::Success => word.green(),
        Status::Failed => word.red().bold(),
        Status::Skipped => word.dimmed(),
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}
