// SPDX-License-Identifier: MIT

//! The five default jobs and their cadences/deadlines.

use std::time::Duration;
use umcc_core::JobSpec;

pub const SUPERVISOR_TICK: &str = "supervisor_tick";
pub const METRICS_SAMPLE: &str = "metrics_sample";
pub const ENFORCEMENT: &str = "enforcement";
pub const HEALTH_PROBE: &str = "health_probe";
pub const AUDIT_ROTATE: &str = "audit_rotate";

/// Builds the default job set at its standard cadences and deadlines.
/// Callers register each against a [`crate::Scheduler`] with the
/// matching job body.
pub fn default_job_specs() -> Vec<JobSpec> {
    vec![
        JobSpec::new(SUPERVISOR_TICK, Duration::from_secs(10), Duration::from_secs(8)),
        JobSpec::new(METRICS_SAMPLE, Duration::from_secs(10), Duration::from_secs(5)),
        JobSpec::new(ENFORCEMENT, Duration::from_secs(2 * 60 * 60), Duration::from_secs(4 * 60)),
        JobSpec::new(HEALTH_PROBE, Duration::from_secs(30), Duration::from_secs(20)),
        JobSpec::new(AUDIT_ROTATE, Duration::from_secs(24 * 60 * 60), Duration::from_secs(60)),
    ]
}

#[cfg(test)]
#[path = "defaults_tests.rs"]
mod tests;
