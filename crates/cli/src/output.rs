// SPDX-License-Identifier: MIT

//! Rendering for `status`/`run-once`/`ask`: text and `--json`
//! both read from the same [`serde_json::Value`] payload the daemon hands
//! back over the control socket, so the two formats never drift apart.

use clap::ValueEnum;
use serde_json::Value;

use crate::color::{codes, should_colorize};

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Prints the `status` response payload.
pub fn print_status(payload: &Value, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(payload).unwrap_or_default());
        return;
    }

    let uptime_ms = payload["uptime_ms"].as_u64().unwrap_or(0);
    println!("{}", paint(codes::HEADER, "umcc status"));
    println!(" uptime: {}", format_duration_ms(uptime_ms));
    println!(
        " cycle: #{} (factor {:.3})",
        payload["cycle_number"].as_u64().unwrap_or(0),
        payload["factor"].as_f64().unwrap_or(1.0)
    );
    println!(" audit: {}", if payload["audit_healthy"].as_bool().unwrap_or(false) { "healthy" } else { "degraded" });

    println!();
    println!("{}", paint(codes::HEADER, "processes"));
    if let Some(processes) = payload["processes"].as_array() {
        if processes.is_empty() {
            println!(" (none registered)");
        }
        for p in processes {
            let name = p["name"].as_str().unwrap_or("?");
            let state = p["state"].as_str().unwrap_or("?");
            let pid = p["pid"].as_u64();
            let restarts = p["restart_count"].as_u64().unwrap_or(0);
            match pid {
                Some(pid) => println!(" {:<16} {:<10} pid={:<8} restarts={}", name, state, pid, restarts),
                None => println!(" {:<16} {:<10} {:<12} restarts={}", name, state, "-", restarts),
            }
        }
    }

    println!();
    println!("{}", paint(codes::HEADER, "last verdict"));
    match payload.get("last_verdict") {
        Some(Value::Null) | None => println!(" (no enforcement cycle has run yet)"),
        Some(verdict) => {
            let class = verdict["class"].as_str().unwrap_or("?");
            let breach_count = verdict["breaches"].as_array().map(|b| b.len()).unwrap_or(0);
            println!(" seq={} class={} breaches={}", verdict["seq"].as_u64().unwrap_or(0), class, breach_count);
            if let Some(breaches) = verdict["breaches"].as_array() {
                for breach in breaches {
                    println!(
                        " {} observed={:.2} threshold={:.2} delta={:.2}{}",
                        breach["metric"].as_str().unwrap_or("?"),
                        breach["observed"].as_f64().unwrap_or(0.0),
                        breach["threshold"].as_f64().unwrap_or(0.0),
                        breach["delta"].as_f64().unwrap_or(0.0),
                        if breach["critical"].as_bool().unwrap_or(false) { " (critical)" } else { "" },
                    );
                }
            }
        }
    }
}

/// Prints the `run-once <job>` response: the raw job outcome, and (for
/// `enforcement`, the only job whose body produces one) the verdict the
/// status payload now carries.
pub fn print_run_once(job: &str, payload: &Value, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(payload).unwrap_or_default());
        return;
    }
    println!("job: {job}");
    println!("outcome: {}", payload["outcome"].as_str().unwrap_or("?"));
}

/// Prints a verdict fetched from `status` immediately after an `enforcement`
/// run-once, so the printed class and the process's exit code agree.
pub fn print_verdict(verdict: &Value, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(verdict).unwrap_or_default());
        return;
    }
    println!("verdict: {}", verdict["class"].as_str().unwrap_or("?"));
    if let Some(breaches) = verdict["breaches"].as_array() {
        for breach in breaches {
            println!(
                " {} observed={:.2} threshold={:.2}",
                breach["metric"].as_str().unwrap_or("?"),
                breach["observed"].as_f64().unwrap_or(0.0),
                breach["threshold"].as_f64().unwrap_or(0.0),
            );
        }
    }
}

/// Prints the `ask "<utterance>"` response: resolved intent, confidence, and
/// operation.
pub fn print_ask(payload: &Value, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(payload).unwrap_or_default());
        return;
    }
    let intent = payload["intent"].as_str().unwrap_or("?");
    let confidence = payload["confidence"].as_f64().unwrap_or(0.0);
    println!("intent: {intent}");
    println!("confidence: {confidence:.2}");
    match payload.get("operation") {
        Some(Value::Null) | None => println!("operation: (none — utterance did not resolve to an action)"),
        Some(op) => {
            let targets = op["targets"].as_array().map(|a| {
                    a.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }).unwrap_or_default();
            println!("operation: {} [{}]", op["kind"].as_str().unwrap_or("?"), targets);
        }
    }
}

fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
