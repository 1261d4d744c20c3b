// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Periodic Scheduler: fires a family of jobs at per-job
//! cadences with wall-clock deadlines and overlap prevention.

mod body;
mod defaults;
mod error;
mod scheduler;

pub use body::{JobBody, JobFuture};
pub use defaults::{
    default_job_specs, AUDIT_ROTATE, ENFORCEMENT, HEALTH_PROBE, METRICS_SAMPLE, SUPERVISOR_TICK,
};
pub use error::SchedulerError;
pub use scheduler::Scheduler;
