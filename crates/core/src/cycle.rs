// SPDX-License-Identifier: MIT

//! `CycleState`: the Improvement Loop's counter, owned exclusively by it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default scaling coefficient: 5% tighter per successful cycle.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.95;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    pub cycle_number: u64,
    pub factor: f64,
    pub last_tighten_at_ms: Option<u64>,
    pub thresholds_reached_floor: BTreeSet<String>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            cycle_number: 0,
            factor: DEFAULT_SCALE_FACTOR,
            last_tighten_at_ms: None,
            thresholds_reached_floor: BTreeSet::new(),
        }
    }
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
