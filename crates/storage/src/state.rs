// SPDX-License-Identifier: MIT

//! Small key-value state store for `cycle.json` / `thresholds.json`,
//! written by a write-temp + fsync + rename pattern. The improvement loop
//! writes this at most once per `enforcement` cycle (every 2h by default),
//! so synchronous writes on the caller's task are cheap enough not to need
//! offloading to a background thread.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use umcc_core::{CycleState, ThresholdSet};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads/writes `cycle.json` and `thresholds.json` under the state
/// directory, each via an atomic write-temp + fsync + rename.
pub struct StateStore {
    cycle_path: PathBuf,
    thresholds_path: PathBuf,
}

impl StateStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            cycle_path: state_dir.join("cycle.json"),
            thresholds_path: state_dir.join("thresholds.json"),
        }
    }

    pub fn load_cycle(&self) -> Result<CycleState, StateError> {
        Self::load_or_default(&self.cycle_path)
    }

    pub fn load_thresholds(&self) -> Result<ThresholdSet, StateError> {
        Self::load_or_default(&self.thresholds_path)
    }

    fn load_or_default<T: Default + serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<T, StateError> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist both `cycle` and `thresholds` atomically (each its own
    /// rename, so a crash between the two leaves one file stale but never
    /// corrupt).
    pub fn save(&self, cycle: &CycleState, thresholds: &ThresholdSet) -> Result<(), StateError> {
        Self::atomic_write(&self.cycle_path, cycle)?;
        Self::atomic_write(&self.thresholds_path, thresholds)?;
        Ok(())
    }

    fn atomic_write<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(value)?;
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
