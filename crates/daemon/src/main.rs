// SPDX-License-Identifier: MIT

//! `umccd`: the detached control daemon binary. Parses the
//! `--state-dir`/`--config`/`--log-level` flags, sets up file logging, and
//! hands off to [`umcc_daemon::run_foreground`] — the same function `umcc
//! up` calls to run the daemon in its own foreground.

use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use umcc_daemon::{run_foreground, Config};

fn parse_args() -> (PathBuf, Option<PathBuf>, String) {
    let mut state_dir = default_state_dir();
    let mut config_path = None;
    let mut log_level = "info".to_string();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--state-dir" => {
                if let Some(value) = args.next() {
                    state_dir = PathBuf::from(value);
                }
            }
            "--config" => {
                if let Some(value) = args.next() {
                    config_path = Some(PathBuf::from(value));
                }
            }
            "--log-level" => {
                if let Some(value) = args.next() {
                    log_level = value;
                }
            }
            "--version" | "-V" => {
                println!("umccd {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(2);
            }
        }
    }

    (state_dir, config_path, log_level)
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
    .map(|home| PathBuf::from(home).join(".umcc"))
    .unwrap_or_else(|| PathBuf::from(".umcc"))
}

fn setup_logging(logs_dir: &std::path::Path, log_level: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let _ = std::fs::create_dir_all(logs_dir);
    let file_appender = tracing_appender::rolling::never(logs_dir, "umccd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(non_blocking))
    .init();

    guard
}

#[tokio::main]
async fn main() {
    let (state_dir, config_path, log_level) = parse_args();
    let config = Config::derive(state_dir, config_path);
    let _log_guard = setup_logging(&config.logs_dir, &log_level);

    match run_foreground(config).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("umccd: {err}");
            std::process::exit(1);
        }
    }
}
