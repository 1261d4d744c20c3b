// SPDX-License-Identifier: MIT

//! Improvement Loop: tightens thresholds after successful
//! cycles, relaxes after violations, and resets to base on dissolution.
//! Exclusively owns `ThresholdSet` and `CycleState` — every other component
//! reads a consistent snapshot via [`ImprovementLoop::thresholds`].

use umcc_core::{CycleState, ThresholdSet, Verdict, VerdictClass};
use umcc_storage::{StateError, StateStore};

/// One threshold's `current` value changing, recorded as a
/// `threshold_change` audit event by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdChange {
    pub metric: String,
    pub before: f64,
    pub after: f64,
}

/// Owns the active threshold set and cycle counter, applying the
/// tighten/relax/reset rules atomically at the end of each `enforcement`
/// cycle.
pub struct ImprovementLoop {
    thresholds: ThresholdSet,
    cycle: CycleState,
    store: StateStore,
}

impl ImprovementLoop {
    /// Loads persisted state, or starts from defaults if none exists yet.
    pub fn load(store: StateStore) -> Result<Self, StateError> {
        let thresholds = store.load_thresholds()?;
        let cycle = store.load_cycle()?;
        Ok(Self {
                thresholds,
                cycle,
                store,
        })
    }

    pub fn with_thresholds(thresholds: ThresholdSet, store: StateStore) -> Self {
        Self {
            thresholds,
            cycle: CycleState::new(),
            store,
        }
    }

    /// Copy-on-read snapshot — readers never hold the write lock across I/O.
    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds.snapshot()
    }

    pub fn cycle(&self) -> CycleState {
        self.cycle.clone()
    }

    /// Applies the tighten/relax/reset rule for `verdict.class`, returning
    /// the set of threshold changes (possibly empty) for the caller to
    /// audit-log, then persists the new state via the atomic state store.
    pub fn apply(&mut self, verdict: &Verdict) -> Result<Vec<ThresholdChange>, StateError> {
        let changes = match verdict.class {
            VerdictClass::Pass => self.tighten_all(),
            VerdictClass::Warn => {
                self.cycle.cycle_number += 1;
                Vec::new()
            }
            VerdictClass::Violation => self.relax_all(),
            VerdictClass::Dissolution => self.reset_all(),
        };

        self.store.save(&self.cycle, &self.thresholds)?;
        Ok(changes)
    }

    fn tighten_all(&mut self) -> Vec<ThresholdChange> {
        let factor = self.cycle.factor;
        let mut changes = Vec::new();
        for (metric, threshold) in self.thresholds.thresholds.iter_mut() {
            if threshold.at_floor() {
                self.cycle.thresholds_reached_floor.insert(metric.clone());
                continue;
            }
            let before = threshold.current;
            if threshold.tighten(factor) {
                changes.push(ThresholdChange {
                        metric: metric.clone(),
                        before,
                        after: threshold.current,
                });
            }
            if threshold.at_floor() {
                self.cycle.thresholds_reached_floor.insert(metric.clone());
            }
        }
        self.cycle.cycle_number += 1;
        changes
    }

    fn relax_all(&mut self) -> Vec<ThresholdChange> {
        let factor = self.cycle.factor;
        let mut changes = Vec::new();
        for (metric, threshold) in self.thresholds.thresholds.iter_mut() {
            // Only thresholds previously tightened away from base have
            // anything to relax — "changed in recent cycles" is interpreted
            // as "not currently at base" absent a concrete cycle count
            // (documented in DESIGN.md).
            if threshold.current == threshold.base {
                continue;
            }
            let before = threshold.current;
            if threshold.relax_one_step(factor) {
                changes.push(ThresholdChange {
                        metric: metric.clone(),
                        before,
                        after: threshold.current,
                });
            }
            self.cycle.thresholds_reached_floor.remove(metric);
        }
        self.cycle.cycle_number += 1;
        changes
    }

    fn reset_all(&mut self) -> Vec<ThresholdChange> {
        let mut changes = Vec::new();
        for (metric, threshold) in self.thresholds.thresholds.iter_mut() {
            let before = threshold.current;
            if threshold.reset_to_base() {
                changes.push(ThresholdChange {
                        metric: metric.clone(),
                        before,
                        after: threshold.current,
                });
            }
        }
        self.cycle.reset();
        changes
    }
}

#[cfg(test)]
#[path = "improvement_tests.rs"]
mod tests;
