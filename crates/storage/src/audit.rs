// SPDX-License-Identifier: MIT

//! Append-only JSON-Lines audit log: single active file, corrupt-tail
//! detection on open, timestamp-suffixed rotation. The audit log never
//! compacts — it is the system's permanent record, so rotation renames the
//! active file aside instead of truncating it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default rotation threshold for the active audit file.
pub const DEFAULT_ROTATE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The closed set of audit event kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    ProcessState,
    JobFire,
    JobFinish,
    Verdict,
    Command,
    ThresholdChange,
    Error,
}

/// An append-only audit record. `seq` is assigned by the writer, never by
/// the caller, so it stays globally monotonic across every producer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub seq: u64,
    pub timestamp_ms: u64,
    pub kind: AuditEventKind,
    pub actor: String,
    pub payload: Value,
}

/// An unsequenced event draft, as submitted by a producer.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub timestamp_ms: u64,
    pub kind: AuditEventKind,
    pub actor: String,
    pub payload: Value,
}

impl AuditDraft {
    pub fn new(
        timestamp_ms: u64,
        kind: AuditEventKind,
        actor: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            timestamp_ms,
            kind,
            actor: actor.into(),
            payload,
        }
    }
}

struct Inner {
    file: File,
    dir: PathBuf,
    active_path: PathBuf,
    next_seq: u64,
    rotate_bytes: u64,
}

/// Single-writer append-only audit log.
///
/// Serialized by a `parking_lot::Mutex`: whichever caller holds the lock
/// assigns the next `seq`, writes the line, and (if the active file has
/// grown past `rotate_bytes`) rotates before releasing it. A single writer
/// serialized by a mutex, with no separate background task, so `seq`
/// assignment and the write that makes it durable happen atomically with
/// respect to every other caller.
pub struct AuditLog {
    inner: Mutex<Inner>,
}

impl AuditLog {
    /// Open (or create) the audit log under `dir/audit/current.jsonl`,
    /// scanning any existing content to resume `seq` after a restart.
    pub fn open(dir: &Path, rotate_bytes: u64) -> Result<Self, AuditError> {
        let audit_dir = dir.join("audit");
        fs::create_dir_all(&audit_dir)?;
        let active_path = audit_dir.join("current.jsonl");

        let next_seq = Self::scan_max_seq(&active_path)?
        .map(|max| max + 1)
        .unwrap_or(0);

        let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&active_path)?;

        Ok(Self {
                inner: Mutex::new(Inner {
                        file,
                        dir: audit_dir,
                        active_path,
                        next_seq,
                        rotate_bytes,
                }),
        })
    }

    fn scan_max_seq(path: &Path) -> Result<Option<u64>, AuditError> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut max_seq = None;
        for line in reader.lines() {
            let line = match line {
                Ok(l) if !l.trim().is_empty() => l,
                _ => continue,
            };
            // Tolerate a truncated last line (crash mid-write); stop there.
            match serde_json::from_str::<AuditEvent>(&line) {
                Ok(event) => max_seq = Some(event.seq),
                Err(_) => break,
            }
        }
        Ok(max_seq)
    }

    /// Append one event, assigning its `seq`. Rotates the active file first
    /// if it has already grown past `rotate_bytes`.
    pub fn append(&self, draft: AuditDraft) -> Result<AuditEvent, AuditError> {
        let mut inner = self.inner.lock();

        if inner.file.metadata()?.len() >= inner.rotate_bytes {
            Self::rotate(&mut inner, draft.timestamp_ms)?;
        }

        let event = AuditEvent {
            seq: inner.next_seq,
            timestamp_ms: draft.timestamp_ms,
            kind: draft.kind,
            actor: draft.actor,
            payload: draft.payload,
        };
        inner.next_seq += 1;

        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        // A single `write_all` of one JSONL record is the OS's atomic
        // O_APPEND write for records under the pipe-write-atomic size
        //; no partial-line interleaving is possible here since
        // every writer goes through this same mutex regardless.
        inner.file.write_all(&line)?;
        inner.file.flush()?;

        Ok(event)
    }

    fn rotate(inner: &mut Inner, timestamp_ms: u64) -> Result<(), AuditError> {
        let secs = (timestamp_ms / 1000) as i64;
        let nanos = ((timestamp_ms % 1000) * 1_000_000) as u32;
        let suffix = chrono::DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.format("%Y%m%dT%H%M%SZ").to_string())
        .unwrap_or_else(|| "19700101T000000Z".to_string());
        let rotated = inner.dir.join(format!("{suffix}.jsonl"));
        inner.file.flush()?;
        fs::rename(&inner.active_path, &rotated)?;
        inner.file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&inner.active_path)?;
        Ok(())
    }

    /// Next sequence number that will be assigned (test/inspection helper).
    pub fn next_seq(&self) -> u64 {
        self.inner.lock().next_seq
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
