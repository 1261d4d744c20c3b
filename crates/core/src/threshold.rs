// SPDX-License-Identifier: MIT

//! `ThresholdSet`: numeric ceilings and floors indexed by metric name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a threshold is a ceiling (`max`, e.g. `cpu_pct_max`) or a floor
/// (`min`, e.g. `coverage_pct_min`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    Max,
    Min,
}

/// A single threshold: its immovable bound (`base`), its tightest-ever bound
/// (`floor` — the tightest value it may ever reach, interpreted as a ceiling
/// for `min`-type thresholds too), and the value currently enforced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Threshold {
    pub kind: ThresholdKind,
    pub base: f64,
    pub floor: f64,
    pub current: f64,
}

impl Threshold {
    pub fn new_max(base: f64, floor: f64) -> Self {
        Self {
            kind: ThresholdKind::Max,
            base,
            floor,
            current: base,
        }
    }

    pub fn new_min(base: f64, ceiling: f64) -> Self {
        Self {
            kind: ThresholdKind::Min,
            base,
            floor: ceiling,
            current: base,
        }
    }

    /// True once `current` has reached its floor/ceiling and cannot tighten further.
    pub fn at_floor(&self) -> bool {
        match self.kind {
            ThresholdKind::Max => self.current <= self.floor,
            ThresholdKind::Min => self.current >= self.floor,
        }
    }

    /// Tighten by scale factor `s` (0 < s < 1), clamped at the floor.
    pub fn tighten(&mut self, s: f64) -> bool {
        let before = self.current;
        self.current = match self.kind {
            ThresholdKind::Max => (self.current * s).max(self.floor),
            ThresholdKind::Min => (self.current / s).min(self.floor),
        };
        self.current != before
    }

    /// Relax by one step toward (but never past) the base value.
    pub fn relax_one_step(&mut self, s: f64) -> bool {
        let before = self.current;
        self.current = match self.kind {
            ThresholdKind::Max => (self.current / s).min(self.base),
            ThresholdKind::Min => (self.current * s).max(self.base),
        };
        self.current != before
    }

    /// Snap back to the base value (dissolution reset).
    pub fn reset_to_base(&mut self) -> bool {
        let before = self.current;
        self.current = self.base;
        self.current != before
    }

    /// Signed distance of `observed` past this threshold; positive means breached.
    pub fn delta(&self, observed: f64) -> f64 {
        match self.kind {
            ThresholdKind::Max => observed - self.current,
            ThresholdKind::Min => self.current - observed,
        }
    }

    /// Relative delta (breach size as a fraction of the threshold), used for
    /// severity classification.
    pub fn relative_delta(&self, observed: f64) -> f64 {
        let d = self.delta(observed);
        if self.current.abs() < f64::EPSILON {
            return if d > 0.0 { f64::INFINITY } else { 0.0 };
        }
        d / self.current.abs()
    }
}

/// The full set of active thresholds, indexed by metric name (`cpu_pct_max`,
/// `mem_pct_max`, `coverage_pct_min`, `build_seconds_max`, `response_ms_max`, …).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub thresholds: BTreeMap<String, Threshold>,
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: impl Into<String>, threshold: Threshold) {
        self.thresholds.insert(metric.into(), threshold);
    }

    pub fn get(&self, metric: &str) -> Option<&Threshold> {
        self.thresholds.get(metric)
    }

    /// Copy-on-read snapshot — callers never hold a lock across I/O.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
