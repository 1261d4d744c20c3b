// SPDX-License-Identifier: MIT

//! `MetricSample`: an immutable, timestamped snapshot produced by the Metrics Probe.

use crate::process::ProcessState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A numeric reading that may be missing or stale rather than zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Known(f64),
    Unknown,
}

impl Reading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Known(v) => Some(*v),
            Reading::Unknown => None,
        }
    }
}

/// A single timestamped snapshot of host and process health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub taken_at_ms: u64,
    pub cpu_pct: Reading,
    pub mem_pct: Reading,
    pub disk_pct: Reading,
    /// Keyed by process name string (`ProcessName::as_str`).
    pub process_states: BTreeMap<String, ProcessState>,
    /// External readings pulled from completion-marker files (coverage,
    /// build duration, response latency, …), keyed by metric name.
    pub external_readings: BTreeMap<String, Reading>,
}

impl MetricSample {
    pub fn empty(taken_at_ms: u64) -> Self {
        Self {
            taken_at_ms,
            cpu_pct: Reading::Unknown,
            mem_pct: Reading::Unknown,
            disk_pct: Reading::Unknown,
            process_states: BTreeMap::new(),
            external_readings: BTreeMap::new(),
        }
    }

    /// Look up a reading by the same metric-name convention `ThresholdSet` uses
    /// (`cpu_pct`, `mem_pct`, `disk_pct`, or an external reading key).
    pub fn reading(&self, metric: &str) -> Option<Reading> {
        match metric {
            "cpu_pct" => Some(self.cpu_pct),
            "mem_pct" => Some(self.mem_pct),
            "disk_pct" => Some(self.disk_pct),
            other => self.external_readings.get(other).copied(),
        }
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
