// SPDX-License-Identifier: MIT

//! Configurable reaction policy: `violation` restarts
//! the offending process if identifiable, `dissolution` quarantines it.

use std::collections::BTreeMap;
use umcc_core::{ProcessName, Verdict, VerdictClass};
use umcc_supervisor::ProcessController;

/// Maps a breached metric name to the process it should be attributed to,
/// so a breach on e.g. `response_ms_max` can be traced back to the process
/// whose readiness probe it measures. Critical process breaches (metric
/// `process_states.<name>`) are always identifiable without consulting this
/// map.
#[derive(Debug, Clone, Default)]
pub struct ReactionPolicy {
    metric_process_map: BTreeMap<String, ProcessName>,
}

impl ReactionPolicy {
    pub fn new(metric_process_map: BTreeMap<String, ProcessName>) -> Self {
        Self { metric_process_map }
    }

    fn offending_process(&self, verdict: &Verdict) -> Option<ProcessName> {
        for breach in &verdict.breaches {
            if let Some(name) = breach.metric.strip_prefix("process_states.") {
                return Some(ProcessName::new(name));
            }
        }
        verdict
        .breaches
        .iter()
        .find_map(|b| self.metric_process_map.get(&b.metric).cloned())
    }

    /// Applies the reaction policy for `verdict.class`. No-op for
    /// `pass`/`warn`. Returns the process name acted on, if any, so the
    /// caller can record it on the `verdict` audit event.
    pub async fn react(
        &self,
        verdict: &Verdict,
        controller: &dyn ProcessController,
    ) -> Option<ProcessName> {
        let name = self.offending_process(verdict)?;
        match verdict.class {
            VerdictClass::Violation => {
                controller.restart(&name).await;
                Some(name)
            }
            VerdictClass::Dissolution => {
                controller.quarantine(&name).await;
                Some(name)
            }
            VerdictClass::Pass | VerdictClass::Warn => None,
        }
    }
}

#[cfg(test)]
#[path = "reaction_tests.rs"]
mod tests;
