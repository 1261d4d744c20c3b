// SPDX-License-Identifier: MIT

//! Enforcement Evaluator: compares a `MetricSample` against
//! the active `ThresholdSet` and produces a `Verdict`.
//!
//! The evaluator takes a copy-on-read snapshot of the threshold set and
//! never holds a lock across the classification pass.

use umcc_core::{Breach, MetricSample, ProcessState, Threshold, ThresholdSet, Verdict, VerdictClass};

/// A process whose state is `Failed` is always a critical breach regardless
/// of its relative delta. Any managed process in `Failed` state is treated
/// this way, not just a distinguished "backend" process (documented in
/// DESIGN.md).
fn critical_process_breaches(sample: &MetricSample) -> Vec<Breach> {
    sample
    .process_states
    .iter()
    .filter(|(_, state)| **state == ProcessState::Failed)
    .map(|(name, _)| Breach {
            metric: format!("process_states.{name}"),
            observed: 1.0,
            threshold: 0.0,
            delta: 1.0,
            relative_delta: f64::INFINITY,
            critical: true,
    })
    .collect()
}

fn threshold_breach(metric: &str, threshold: &Threshold, observed: f64) -> Option<Breach> {
    let delta = threshold.delta(observed);
    if delta <= 0.0 {
        return None;
    }
    Some(Breach {
            metric: metric.to_string(),
            observed,
            threshold: threshold.current,
            delta,
            relative_delta: threshold.relative_delta(observed),
            critical: false,
    })
}

/// Stateless evaluator: classification is a pure function of the sample and
/// threshold snapshot, so [`Verdict`]s are byte-identical (up to `seq`) for
/// identical inputs.
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Runs the classification algorithm, assigning `seq` to
    /// the resulting `Verdict`.
    pub fn evaluate(&self, sample: &MetricSample, thresholds: &ThresholdSet, seq: u64) -> Verdict {
        let mut breaches = Vec::new();

        for (metric, threshold) in &thresholds.thresholds {
            let Some(reading) = sample.reading(metric) else {
                continue;
            };
            let Some(observed) = reading.value() else {
                continue;
            };
            if let Some(breach) = threshold_breach(metric, threshold, observed) {
                breaches.push(breach);
            }
        }

        breaches.extend(critical_process_breaches(sample));

        let class = classify(&breaches);
        Verdict { seq, class, breaches }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// The severity table used to classify a set of breaches. Tie-break across
/// simultaneous breaches is the maximum severity across all of them.
fn classify(breaches: &[Breach]) -> VerdictClass {
    if breaches.is_empty() {
        return VerdictClass::Pass;
    }
    if breaches.iter().any(|b| b.critical) {
        return VerdictClass::Dissolution;
    }
    let worst = breaches
    .iter()
    .map(|b| b.relative_delta)
    .fold(f64::NEG_INFINITY, f64::max);

    if worst >= 0.25 {
        VerdictClass::Dissolution
    } else if worst >= 0.10 {
        VerdictClass::Violation
    } else {
        VerdictClass::Warn
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
