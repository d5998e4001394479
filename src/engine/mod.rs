// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Execution engine
//!
//! Step execution within one job variant and concurrent scheduling of
//! all variants of a pipeline.

mod interpolate;
mod result;
mod scheduler;
mod step;

#[cfg(test)]
pub(crate) mod testing;

pub use interpolate::{interpolate, matrix_env_name};
pub use result::{JobResult, Status, StepResult, StepStatus};
pub(crate) use result::serialize_millis;
pub use scheduler::{JobScheduler, SchedulePolicy};
pub use step::{JobContext, StepExecutor};
