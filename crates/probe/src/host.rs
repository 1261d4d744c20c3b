// SPDX-License-Identifier: MIT

//! Host CPU/memory/disk sampling via `sysinfo`.

use sysinfo::{Disks, System};
use umcc_core::Reading;

pub struct HostSample {
    pub cpu_pct: Reading,
    pub mem_pct: Reading,
    pub disk_pct: Reading,
}

/// Wraps a `sysinfo::System`, refreshed in place on each call so repeated
/// samples don't pay for a fresh process/CPU enumeration every time.
pub struct HostSampler {
    system: System,
}

impl HostSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }

    /// Samples host CPU/memory/disk once. CPU usage from `sysinfo` is only
    /// meaningful after at least one prior refresh, so a fresh sampler's
    /// first reading may read `0.0` — acceptable here since `metrics_sample`
    /// fires every 10s and every reading after the first is accurate.
    pub fn refresh(&mut self) -> HostSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let cpu_pct = self.system.global_cpu_usage() as f64;

        let total_mem = self.system.total_memory();
        let mem_pct = if total_mem > 0 {
            (self.system.used_memory() as f64 / total_mem as f64) * 100.0
        } else {
            return HostSample {
                cpu_pct: Reading::Known(cpu_pct),
                mem_pct: Reading::Unknown,
                disk_pct: disk_pct(),
            };
        };

        HostSample {
            cpu_pct: Reading::Known(cpu_pct),
            mem_pct: Reading::Known(mem_pct),
            disk_pct: disk_pct(),
        }
    }
}

impl Default for HostSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Disk usage across every mounted disk `sysinfo` can see, weighted by
/// total space. Returns `Unknown` if no disks are visible (e.g. a sandboxed
/// test environment).
fn disk_pct() -> Reading {
    let disks = Disks::new_with_refreshed_list();
    let (total, available): (u64, u64) = disks
    .iter()
    .map(|d| (d.total_space(), d.available_space()))
    .fold((0, 0), |(t, a), (dt, da)| (t + dt, a + da));

    if total == 0 {
        return Reading::Unknown;
    }
    let used = total.saturating_sub(available);
    Reading::Known((used as f64 / total as f64) * 100.0)
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
