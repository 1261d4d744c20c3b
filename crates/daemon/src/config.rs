// SPDX-License-Identifier: MIT

//! Startup configuration: every path the daemon touches is
//! derived from a single state directory, with one `state_dir()` fanning
//! out to every other path.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use umcc_core::{ErrorKind, ProcessSpec, ReadinessProbe};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("parsing {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

/// The `[[processes]]` and `[thresholds.*]` tables read from `config.toml`.
/// Absent entirely, or with either table empty, is a valid config: the
/// daemon then falls back to the single `echo-loop` process and a baseline
/// `cpu_pct` threshold.
#[derive(Debug, Deserialize, Default)]
pub struct RawConfig {
    #[serde(default)]
    pub processes: Vec<ProcessConfig>,
    #[serde(default)]
    pub thresholds: BTreeMap<String, ThresholdConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessConfig {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub readiness: Option<ReadinessConfig>,
    #[serde(default)]
    pub readiness_timeout_secs: Option<u64>,
    #[serde(default)]
    pub stop_grace_secs: Option<u64>,
    #[serde(default)]
    pub max_restarts: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessConfig {
    TcpConnect { host: String, port: u16 },
    HttpOk { host: String, port: u16, path: String },
    MarkerFile { path: PathBuf },
}

#[derive(Debug, Deserialize)]
pub struct ThresholdConfig {
    #[serde(rename = "type", default = "default_threshold_kind")]
    pub kind: String,
    pub base: f64,
    /// Floor for `max` thresholds, ceiling for `min` thresholds.
    pub bound: f64,
}

fn default_threshold_kind() -> String {
    "max".to_string()
}

/// Paths and parsed settings the daemon needs at startup, all derived from
/// `state_dir`.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub pids_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub audit_dir: PathBuf,
    pub thresholds_path: PathBuf,
    pub cycle_path: PathBuf,
}

impl Config {
    pub fn derive(state_dir: impl Into<PathBuf>, config_path: Option<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            config_path: config_path.unwrap_or_else(|| state_dir.join("config.toml")),
            socket_path: state_dir.join("control.sock"),
            lock_path: state_dir.join("umccd.lock"),
            pids_dir: state_dir.join("pids"),
            logs_dir: state_dir.join("logs"),
            audit_dir: state_dir.join("audit"),
            thresholds_path: state_dir.join("thresholds.json"),
            cycle_path: state_dir.join("cycle.json"),
            state_dir,
        }
    }

    /// Reads `config.toml` if present; a missing file is not an error — the
    /// daemon starts with spec-default processes and thresholds.
    pub fn load_raw(&self) -> Result<RawConfig, ConfigError> {
        match std::fs::read_to_string(&self.config_path) {
            Ok(text) => toml::from_str(&text).map_err(|source| ConfigError::Toml {
                    path: self.config_path.clone(),
                    source,
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(RawConfig::default()),
            Err(source) => Err(ConfigError::Io { path: self.config_path.clone(), source }),
        }
    }
}

/// The default managed process, used whenever `config.toml` declares none.
pub fn default_process_specs(logs_dir: &Path) -> Vec<ProcessSpec> {
    let mut spec = ProcessSpec::new("echo-loop", "sh");
    spec.args = vec![
        "-c".to_string(),
        "while true; do echo hi; sleep 1; done".to_string(),
    ];
    spec.stdout_log = logs_dir.join("echo-loop.stdout");
    spec.stderr_log = logs_dir.join("echo-loop.stderr");
    spec.readiness = Some(ReadinessProbe::MarkerFile { path: logs_dir.join("echo-loop.stdout") });
    spec.readiness_timeout = Duration::from_secs(2);
    vec![spec]
}

/// The default threshold set, used whenever `config.toml` declares none.
pub fn default_thresholds() -> umcc_core::ThresholdSet {
    let mut thresholds = umcc_core::ThresholdSet::new();
    thresholds.insert("cpu_pct", umcc_core::Threshold::new_max(50.0, 40.0));
    thresholds
}

pub fn process_spec_from_config(cfg: &ProcessConfig, logs_dir: &Path) -> ProcessSpec {
    let mut spec = ProcessSpec::new(cfg.name.clone(), cfg.program.clone());
    spec.args = cfg.args.clone();
    if let Some(cwd) = &cfg.cwd {
        spec.cwd = cwd.clone();
    }
    spec.env = cfg.env.clone();
    spec.stdout_log = logs_dir.join(format!("{}.stdout", cfg.name));
    spec.stderr_log = logs_dir.join(format!("{}.stderr", cfg.name));
    spec.readiness = cfg.readiness.as_ref().map(|r| match r {
            ReadinessConfig::TcpConnect { host, port } => {
                ReadinessProbe::TcpConnect { host: host.clone(), port: *port }
            }
            ReadinessConfig::HttpOk { host, port, path } => {
                ReadinessProbe::HttpOk { host: host.clone(), port: *port, path: path.clone() }
            }
            ReadinessConfig::MarkerFile { path } => ReadinessProbe::MarkerFile { path: path.clone() },
    });
    if let Some(secs) = cfg.readiness_timeout_secs {
        spec.readiness_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cfg.stop_grace_secs {
        spec.stop_grace = Duration::from_secs(secs);
    }
    if let Some(max) = cfg.max_restarts {
        spec.max_restarts = max;
    }
    spec
}

pub fn threshold_from_config(cfg: &ThresholdConfig) -> umcc_core::Threshold {
    match cfg.kind.as_str() {
        "min" => umcc_core::Threshold::new_min(cfg.base, cfg.bound),
        _ => umcc_core::Threshold::new_max(cfg.base, cfg.bound),
    }
}

/// Resolves process specs and thresholds from `raw`, falling back to
/// defaults for whichever table is empty.
pub fn resolve(raw: &RawConfig, logs_dir: &Path) -> (Vec<ProcessSpec>, umcc_core::ThresholdSet) {
    let processes = if raw.processes.is_empty() {
        default_process_specs(logs_dir)
    } else {
        raw.processes.iter().map(|p| process_spec_from_config(p, logs_dir)).collect()
    };

    let thresholds = if raw.thresholds.is_empty() {
        default_thresholds()
    } else {
        let mut set = umcc_core::ThresholdSet::new();
        for (metric, cfg) in &raw.thresholds {
            set.insert(metric, threshold_from_config(cfg));
        }
        set
    };

    (processes, thresholds)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
