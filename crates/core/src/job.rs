// SPDX-License-Identifier: MIT

//! `Job`: a scheduled periodic task owned exclusively by the Scheduler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::id::JobName;

/// What the scheduler does when a job's previous run has not finished by its
/// next fire time. The spec only allows `Skip` — queuing is never supported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverlapPolicy {
    Skip,
}

/// Immutable scheduling spec for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: JobName,
    pub cadence: Duration,
    pub deadline: Duration,
    pub overlap_policy: OverlapPolicy,
}

impl JobSpec {
    pub fn new(name: impl Into<JobName>, cadence: Duration, deadline: Duration) -> Self {
        Self {
            name: name.into(),
            cadence,
            deadline,
            overlap_policy: OverlapPolicy::Skip,
        }
    }
}

/// Outcome of a single job run, recorded in [`JobRuntime`] and the audit log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobRunOutcome {
    Completed,
    Skipped,
    Cancelled,
    Failed,
}

/// Mutable runtime fields tracked per job by the Scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRuntime {
    pub last_fired_ms: Option<u64>,
    pub last_finished_ms: Option<u64>,
    pub last_outcome: Option<JobRunOutcome>,
    pub consecutive_failures: u32,
    pub running: bool,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
