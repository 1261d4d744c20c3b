// SPDX-License-Identifier: MIT

//! `umcc` — the CLI front end for the Perpetual Enforcement & Recursive
//! Improvement Engine. `up` runs the daemon in the foreground
//! of this process (the same [`umcc_daemon::run_foreground`] the detached
//! `umccd` binary calls); every other subcommand is a thin control-socket
//! client.

mod audit_tail;
mod client;
mod color;
mod output;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use output::OutputFormat;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use umcc_daemon::{operations::InstructionDoc, Config, Request, Response};

use crate::client::{ClientError, DaemonClient};

#[derive(Parser)]
#[command(name = "umcc", version, about = "Perpetual Enforcement & Recursive Improvement Engine")]
struct Cli {
    /// State directory holding config.toml, thresholds, pids, logs, audit
    #[arg(long = "state-dir", global = true, value_name = "PATH")]
    state_dir: Option<PathBuf>,

    /// Path to config.toml, if not `<state-dir>/config.toml`
    #[arg(long = "config", global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log verbosity for `up`'s in-process daemon
    #[arg(long = "log-level", global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register default specs and start all; block until signal
    Up {
        /// Read one JSON instruction document from stdin and execute its
        /// actions instead of blocking for a signal
        #[arg(long)]
        process_stdin: bool,
    },
    /// Send shutdown to a running instance via its control socket
    Down,
    /// Print component states, last verdict, cycle number
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Fire a named job immediately, outside schedule; print verdict
    RunOnce {
        job: String,
        #[arg(long)]
        json: bool,
    },
    /// NL dispatch; print resolved Operation and confidence
    Ask {
        utterance: String,
        #[arg(long)]
        json: bool,
    },
    /// Stream audit events from seq N
    TailAudit {
        /// First sequence number to print (default 0 — everything on disk)
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// Keep streaming new events after catching up
        #[arg(short, long)]
        follow: bool,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("umcc: {err}");
            std::process::exit(1);
        }
    }
}

fn resolved_state_dir(cli_value: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_value {
        return p;
    }
    if let Ok(p) = std::env::var("OMNI_STATE_DIR") {
        if !p.is_empty() {
            return PathBuf::from(p);
        }
    }
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".umcc")).unwrap_or_else(|| PathBuf::from(".umcc"))
}

fn resolved_config_path(cli_value: Option<PathBuf>) -> Option<PathBuf> {
    cli_value.or_else(|| std::env::var("OMNI_CONFIG").ok().filter(|s| !s.is_empty()).map(PathBuf::from))
}

fn resolved_log_level(cli_value: String) -> String {
    if cli_value != "info" {
        return cli_value;
    }
    std::env::var("OMNI_LOG_LEVEL").ok().filter(|s| !s.is_empty()).unwrap_or(cli_value)
}

async fn run(cli: Cli) -> Result<i32> {
    let state_dir = resolved_state_dir(cli.state_dir.clone());
    let config_path = resolved_config_path(cli.config.clone());
    let log_level = resolved_log_level(cli.log_level.clone());
    let config = Config::derive(&state_dir, config_path);

    match cli.command {
        Commands::Up { process_stdin } => run_up(config, &log_level, process_stdin).await,
        Commands::Down => run_down(&config).await,
        Commands::Status { json } => run_status(&config, format_of(json)).await,
        Commands::RunOnce { job, json } => run_once(&config, &job, format_of(json)).await,
        Commands::Ask { utterance, json } => run_ask(&config, &utterance, format_of(json)).await,
        Commands::TailAudit { from, follow, json } => run_tail_audit(&config, from, follow, format_of(json)).await,
    }
}

fn format_of(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

/// `up`. Plain `up` blocks in the foreground, exactly like
/// `umccd`'s own entry point. `up --process-stdin` instead bootstraps the
/// daemon just long enough to run one instruction document, then shuts
/// back down — it never binds the control socket, so it can run alongside
/// (or instead of) a long-lived `umcc up`.
async fn run_up(config: Config, log_level: &str, process_stdin: bool) -> Result<i32> {
    if process_stdin {
        return run_process_stdin(config).await;
    }

    setup_logging(&config.logs_dir, log_level);
    match umcc_daemon::run_foreground(config).await {
        Ok(code) => Ok(code),
        Err(err) => {
            let is_config_error = matches!(&err, umcc_daemon::ForegroundError::Bootstrap(b) if b.kind() == umcc_core::ErrorKind::Config);
            eprintln!("umcc up: {err}");
            Ok(if is_config_error { 2 } else { 1 })
        }
    }
}

async fn run_process_stdin(config: Config) -> Result<i32> {
    std::fs::create_dir_all(&config.logs_dir).ok();
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("reading instruction document from stdin")?;
    let doc: InstructionDoc = serde_json::from_str(&buf).context("parsing instruction document")?;

    let bootstrap = umcc_daemon::bootstrap(config, umcc_core::AnyClock::System(umcc_core::SystemClock))
    .await
    .map_err(|e| anyhow!("bootstrap: {e}"))?;
    bootstrap.daemon.execute_instructions(&doc).await;
    bootstrap.daemon.shutdown(std::time::Duration::from_secs(5)).await;
    bootstrap.shutdown.cancel();
    let _ = bootstrap.audit_join.await;
    Ok(0)
}

fn setup_logging(logs_dir: &std::path::Path, log_level: &str) {
    let _ = std::fs::create_dir_all(logs_dir);
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}

/// `down`: 0 on a clean shutdown request, 3 if no instance is
/// running against this state directory.
async fn run_down(config: &Config) -> Result<i32> {
    let client = DaemonClient::new(&config.socket_path);
    match client.send(&Request::Shutdown).await {
        Ok(Response::Ok { .. }) => Ok(0),
        Ok(Response::Err { error, .. }) => {
            eprintln!("umcc down: {error}");
            Ok(1)
        }
        Err(ClientError::NotRunning(_)) => {
            eprintln!("umcc down: not running");
            Ok(3)
        }
        Err(err) => Err(err.into()),
    }
}

/// `status [--json]`: always exits 0, even when no daemon is
/// running against this state directory — that absence is itself a status.
async fn run_status(config: &Config, format: OutputFormat) -> Result<i32> {
    let client = DaemonClient::new(&config.socket_path);
    match client.send(&Request::Status).await {
        Ok(Response::Ok { payload }) => {
            output::print_status(&payload, format);
            Ok(0)
        }
        Ok(Response::Err { error, .. }) => {
            eprintln!("umcc status: {error}");
            Ok(0)
        }
        Err(ClientError::NotRunning(_)) => {
            match format {
                OutputFormat::Json => println!(r#"{{"running":false}}"#),
                OutputFormat::Text => println!("umccd is not running at {}", config.socket_path.display()),
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("umcc status: {err}");
            Ok(0)
        }
    }
}

/// `run-once <job>`: for `enforcement`, the only job whose
/// body produces a [`umcc_core::Verdict`], fetches `status` immediately
/// after and exits by verdict class; any other job exits 0 once it
/// completes, 1 otherwise.
async fn run_once(config: &Config, job: &str, format: OutputFormat) -> Result<i32> {
    let client = DaemonClient::new(&config.socket_path);
    let response = client.send(&Request::RunOnce { job: job.to_string() }).await?;
    let payload = match response {
        Response::Ok { payload } => payload,
        Response::Err { error, .. } => {
            eprintln!("umcc run-once: {error}");
            return Ok(1);
        }
    };

    if job == "enforcement" {
        if let Response::Ok { payload: status } = client.send(&Request::Status).await? {
            if let Some(verdict) = status.get("last_verdict").filter(|v| !v.is_null()) {
                output::print_verdict(verdict, format);
                let class = verdict["class"].as_str().unwrap_or("pass");
                return Ok(match class {
                        "pass" => 0,
                        "warn" => 1,
                        "violation" => 2,
                        "dissolution" => 3,
                        _ => 1,
                });
            }
        }
    }

    output::print_run_once(job, &payload, format);
    Ok(if payload["outcome"].as_str() == Some("completed") { 0 } else { 1 })
}

/// `ask "<utterance>"`: 0 if the utterance resolved to a known
/// intent, non-zero (1) if it classified `unknown`.
async fn run_ask(config: &Config, utterance: &str, format: OutputFormat) -> Result<i32> {
    let client = DaemonClient::new(&config.socket_path);
    let response = client.send(&Request::Ask { utterance: utterance.to_string() }).await?;
    match response {
        Response::Ok { payload } => {
            output::print_ask(&payload, format);
            Ok(if payload["intent"].as_str() == Some("unknown") { 1 } else { 0 })
        }
        Response::Err { error, .. } => {
            eprintln!("umcc ask: {error}");
            Ok(1)
        }
    }
}

async fn run_tail_audit(config: &Config, from: u64, follow: bool, format: OutputFormat) -> Result<i32> {
    audit_tail::run(&config.audit_dir, from, follow, format).await?;
    Ok(0)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
