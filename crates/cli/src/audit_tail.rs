// SPDX-License-Identifier: MIT

//! `tail-audit`: streams audit events from seq `N` onward.
//! Reads the JSONL files directly rather than going over the control
//! socket — `tail-audit` is deliberately absent from the control protocol's
//! op list, so this works even against a state directory with
//! no daemon currently attached to it, and keeps working across a rotation
//! that happens mid-stream: print what's already on disk, then watch the
//! active file for new lines.

use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Prints every audit record with `seq >= from_seq` found in `audit_dir`'s
/// rotated files (oldest first, by filename) followed by the active
/// `current.jsonl`, then — if `follow` — watches `current.jsonl` for new
/// lines until Ctrl-C.
pub async fn run(audit_dir: &Path, from_seq: u64, follow: bool, format: crate::output::OutputFormat) -> anyhow::Result<()> {
    let mut rotated: Vec<_> = std::fs::read_dir(audit_dir)
    .map(|entries| {
            entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jsonl") && p.file_name().map(|n| n != "current.jsonl").unwrap_or(false))
            .collect::<Vec<_>>()
    })
    .unwrap_or_default();
    rotated.sort();

    let active_path = audit_dir.join("current.jsonl");
    for path in rotated.iter().chain(std::iter::once(&active_path)) {
        print_from(path, from_seq, format);
    }

    if follow {
        follow_active(&active_path, format).await?;
    }

    Ok(())
}

fn print_from(path: &Path, from_seq: u64, format: crate::output::OutputFormat) {
    let Ok(file) = File::open(path) else { return };
    for line in BufReader::new(file).lines().map_while(Result::ok) {
        if line.trim().is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<Value>(&line) else { continue };
        let seq = event["seq"].as_u64().unwrap_or(0);
        if seq >= from_seq {
            print_event(&event, format);
        }
    }
}

fn print_event(event: &Value, format: crate::output::OutputFormat) {
    match format {
        crate::output::OutputFormat::Json => println!("{event}"),
        crate::output::OutputFormat::Text => println!(
            "{:>8} {:>14} {:<16} {}",
            event["seq"].as_u64().unwrap_or(0),
            event["timestamp_ms"].as_u64().unwrap_or(0),
            event["kind"].as_str().unwrap_or("?"),
            event["payload"],
        ),
    }
}

async fn follow_active(path: &Path, format: crate::output::OutputFormat) -> anyhow::Result<()> {
    use notify::{Event, EventKind, RecursiveMode, Watcher};

    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Ok(()),
    };
    file.seek(SeekFrom::End(0))?;
    let mut reader = BufReader::new(file);

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
            if let Ok(event) = res {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = tx.blocking_send(());
                }
            }
    })?;
    let watch_dir = path.parent().unwrap_or(path);
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            if let Ok(event) = serde_json::from_str::<Value>(line.trim_end()) {
                print_event(&event, format);
            }
            line.clear();
        }

        tokio::select! {
            _ = rx.recv() => {}
            _ = &mut ctrl_c => break,
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "audit_tail_tests.rs"]
mod tests;
