// SPDX-License-Identifier: MIT

//! External readings: small JSON "completion marker" files the supervised
//! children agree to write on completion — e.g. a coverage
//! run drops `coverage_pct.json`, a build drops `build_seconds.json`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use umcc_core::Reading;

/// One external metric's marker file and the cadence it should track.
#[derive(Debug, Clone)]
pub struct Marker {
    pub metric: String,
    pub path: PathBuf,
    /// Reading is downgraded to `unknown` once older than `2 * cadence_ms`.
    pub cadence_ms: u64,
}

#[derive(Debug, Deserialize)]
struct MarkerFile {
    value: f64,
    timestamp_ms: u64,
}

/// Reads a fixed set of marker files on each probe cycle.
pub struct ExternalReadings {
    markers: Vec<Marker>,
}

impl ExternalReadings {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    pub fn empty() -> Self {
        Self { markers: Vec::new() }
    }

    /// Reads every configured marker, downgrading missing or stale readings
    /// to [`Reading::Unknown`] rather than `0`.
    pub fn read_all(&self, now_ms: u64) -> BTreeMap<String, Reading> {
        let mut out = BTreeMap::new();
        for marker in &self.markers {
            out.insert(marker.metric.clone(), Self::read_one(marker, now_ms));
        }
        out
    }

    fn read_one(marker: &Marker, now_ms: u64) -> Reading {
        let Ok(bytes) = std::fs::read(&marker.path) else {
            return Reading::Unknown;
        };
        let Ok(parsed) = serde_json::from_slice::<MarkerFile>(&bytes) else {
            return Reading::Unknown;
        };
        let max_age_ms = marker.cadence_ms.saturating_mul(2);
        let age_ms = now_ms.saturating_sub(parsed.timestamp_ms);
        if age_ms > max_age_ms {
            Reading::Unknown
        } else {
            Reading::Known(parsed.value)
        }
    }
}

#[cfg(test)]
#[path = "external_tests.rs"]
mod tests;
