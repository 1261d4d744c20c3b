// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Metrics Probe: produces [`umcc_core::MetricSample`] values.
//!
//! Host CPU/memory/disk come from a single `sysinfo::System::refresh_*` pass
//! per call. Process liveness comes from the Supervisor's `status_all`
//! snapshot, never from PID files — those exist for crash recovery only.
//! External readings are read from small JSON "completion marker" files the
//! supervised children are expected to drop on disk; a marker older than
//! twice the relevant cadence is reported `unknown` rather than `0`.

mod external;
mod host;

pub use external::{ExternalReadings, Marker};
pub use host::HostSampler;

use std::sync::Arc;
use umcc_core::{AnyClock, Clock, MetricSample, Reading};
use umcc_supervisor::Supervisor;

/// Produces [`MetricSample`]s by combining host metrics, process states, and
/// external completion markers.
pub struct MetricsProbe {
    host: HostSampler,
    supervisor: Arc<Supervisor>,
    external: ExternalReadings,
    clock: AnyClock,
}

impl MetricsProbe {
    pub fn new(supervisor: Arc<Supervisor>, external: ExternalReadings, clock: AnyClock) -> Self {
        Self {
            host: HostSampler::new(),
            supervisor,
            external,
            clock,
        }
    }

    /// Samples host metrics, process states, and external readings. Never
    /// fails: any unavailable field is reported as [`Reading::Unknown`]
    /// rather than erroring the whole sample.
    pub async fn sample(&mut self) -> MetricSample {
        let taken_at_ms = self.clock.epoch_ms();
        let host = self.host.refresh();

        let mut sample = MetricSample {
            taken_at_ms,
            cpu_pct: host.cpu_pct,
            mem_pct: host.mem_pct,
            disk_pct: host.disk_pct,
            process_states: Default::default(),
            external_readings: Default::default(),
        };

        for snapshot in self.supervisor.status_all().await {
            sample
            .process_states
            .insert(snapshot.name.as_str().to_string(), snapshot.state);
        }

        sample.external_readings = self.external.read_all(taken_at_ms);
        sample
    }
}

/// A reading that could not be refreshed this cycle keeps its prior value
/// stale rather than flipping to zero — callers should treat [`Reading`]
/// as the unit of "known vs not", not this helper.
pub fn unknown_if_stale(reading: Reading, age_ms: u64, max_age_ms: u64) -> Reading {
    if age_ms > max_age_ms {
        Reading::Unknown
    } else {
        reading
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
