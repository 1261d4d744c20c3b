// SPDX-License-Identifier: MIT

//! Recurring, cadence-aware job scheduler.
//!
//! A single dispatch loop drains a min-heap keyed on next-fire time. Each
//! fire spawns the job body on its own task racing a deadline; overlap is
//! prevented with a per-job `running` flag rather than queuing, so a slow
//! job is skipped (not delayed into a backlog) on its next cadence.

use crate::body::JobBody;
use crate::SchedulerError;
use serde_json::json;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use umcc_core::{AnyClock, Clock, JobName, JobRunOutcome, JobRuntime, JobSpec};
use umcc_storage::{AuditEventKind, AuditHandle};

struct JobEntry {
    spec: JobSpec,
    body: JobBody,
    runtime: JobRuntime,
    running: Arc<AtomicBool>,
    next_fire: Instant,
}

struct HeapKey {
    fire_at: Instant,
    seq: u64,
    name: JobName,
}

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        (self.fire_at, self.seq) == (other.fire_at, other.seq)
    }
}
impl Eq for HeapKey {}
impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.fire_at, self.seq).cmp(&(other.fire_at, other.seq))
    }
}

struct JobCompletion {
    name: JobName,
    outcome: JobRunOutcome,
}

/// Owns every registered [`JobSpec`] and drives the single dispatch loop.
/// Not `Clone` — there is exactly one scheduler per daemon, wired in as a
/// plain field on the root `Daemon` struct (no singleton).
pub struct Scheduler {
    clock: AnyClock,
    audit: AuditHandle,
    jobs: HashMap<JobName, JobEntry>,
    heap: BinaryHeap<Reverse<HeapKey>>,
    next_seq: u64,
    completions_tx: mpsc::Sender<JobCompletion>,
    completions_rx: mpsc::Receiver<JobCompletion>,
}

impl Scheduler {
    pub fn new(clock: AnyClock, audit: AuditHandle) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel(64);
        Self {
            clock,
            audit,
            jobs: HashMap::new(),
            heap: BinaryHeap::new(),
            next_seq: 0,
            completions_tx,
            completions_rx,
        }
    }

    /// Registers `spec` with `body`, to first fire after one cadence period
    /// from now. Fails if a job with this name is already registered.
    pub fn register(&mut self, spec: JobSpec, body: JobBody) -> Result<(), SchedulerError> {
        if self.jobs.contains_key(&spec.name) {
            return Err(SchedulerError::AlreadyRegistered(spec.name.clone()));
        }
        let next_fire = Instant::now() + spec.cadence;
        let name = spec.name.clone();
        let seq = self.next_seq;
        self.next_seq += 1;

        self.jobs.insert(
            name.clone(),
            JobEntry {
                spec,
                body,
                runtime: JobRuntime::default(),
                running: Arc::new(AtomicBool::new(false)),
                next_fire,
            },
        );
        self.heap.push(Reverse(HeapKey {
                    fire_at: next_fire,
                    seq,
                    name,
        }));
        Ok(())
    }

    /// Drops a job. Any already-queued heap entry for it is discarded lazily
    /// on the next tick.
    pub fn cancel(&mut self, name: &JobName) -> Result<(), SchedulerError> {
        self.jobs
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| SchedulerError::NotRegistered(name.clone()))
    }

    /// Drops every job whose name starts with `prefix`.
    pub fn cancel_with_prefix(&mut self, prefix: &str) {
        self.jobs.retain(|name, _| !name.as_str().starts_with(prefix));
    }

    pub fn runtime_of(&self, name: &JobName) -> Option<JobRuntime> {
        self.jobs.get(name).map(|e| e.runtime.clone())
    }

    pub fn job_names(&self) -> Vec<JobName> {
        self.jobs.keys().cloned().collect()
    }

    /// Runs the dispatch loop until `shutdown` is cancelled. Consumes
    /// `self` — there is only ever one live loop per scheduler instance.
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            let wake = self.heap.peek().map(|Reverse(k)| k.fire_at);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                Some(completion) = self.completions_rx.recv() => {
                    self.apply_completion(completion);
                }
                _ = Self::wait_until(wake) => {
                    self.tick();
                }
            }
        }
    }

    async fn wait_until(wake: Option<Instant>) {
        match wake {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        loop {
            let due = match self.heap.peek() {
                Some(Reverse(key)) if key.fire_at <= now => true,
                _ => false,
            };
            if !due {
                break;
            }
            if let Some(Reverse(key)) = self.heap.pop() {
                let is_current = self
                .jobs
                .get(&key.name)
                .is_some_and(|e| e.next_fire == key.fire_at);
                if is_current {
                    self.dispatch(key.name);
                }
                // else: stale entry left behind by a since-cancelled job; drop it.
            }
        }
    }

    fn dispatch(&mut self, name: JobName) {
        let now_ms = self.clock.epoch_ms();
        let Some(entry) = self.jobs.get_mut(&name) else {
            return;
        };

        if entry.running.load(Ordering::Acquire) {
            entry.runtime.last_outcome = Some(JobRunOutcome::Skipped);
            self.emit_finish(&name, "skip", now_ms);
            self.reschedule(&name);
            return;
        }

        entry.running.store(true, Ordering::Release);
        entry.runtime.running = true;
        entry.runtime.last_fired_ms = Some(now_ms);
        self.emit_fire(&name, now_ms);

        let body = entry.body.clone();
        let deadline = entry.spec.deadline;
        let running_flag = entry.running.clone();
        let tx = self.completions_tx.clone();
        let job_name = name.clone();

        tokio::spawn(async move {
                let token = CancellationToken::new();
                let body_token = token.clone();
                let outcome = tokio::select! {
                    outcome = body(body_token) => outcome,
                    _ = sleep(deadline) => {
                        token.cancel();
                        JobRunOutcome::Cancelled
                    }
                };
                running_flag.store(false, Ordering::Release);
                let _ = tx.send(JobCompletion { name: job_name, outcome }).await;
        });

        self.reschedule(&name);
    }

    fn reschedule(&mut self, name: &JobName) {
        let next_fire = match self.jobs.get_mut(name) {
            Some(entry) => {
                entry.next_fire += entry.spec.cadence;
                entry.next_fire
            }
            None => return,
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(HeapKey {
                    fire_at: next_fire,
                    seq,
                    name: name.clone(),
        }));
    }

    fn apply_completion(&mut self, completion: JobCompletion) {
        let now_ms = self.clock.epoch_ms();
        let label = match completion.outcome {
            JobRunOutcome::Completed => "completed",
            JobRunOutcome::Skipped => "skip",
            JobRunOutcome::Cancelled => "deadline_exceeded",
            JobRunOutcome::Failed => "failed",
        };
        if let Some(entry) = self.jobs.get_mut(&completion.name) {
            entry.runtime.running = false;
            entry.runtime.last_finished_ms = Some(now_ms);
            entry.runtime.last_outcome = Some(completion.outcome);
            match completion.outcome {
                JobRunOutcome::Failed | JobRunOutcome::Cancelled => {
                    entry.runtime.consecutive_failures += 1;
                }
                JobRunOutcome::Completed | JobRunOutcome::Skipped => {
                    entry.runtime.consecutive_failures = 0;
                }
            }
        }
        self.emit_finish(&completion.name, label, now_ms);
    }

    fn emit_fire(&self, name: &JobName, now_ms: u64) {
        let audit = self.audit.clone();
        let actor = name.as_str().to_string();
        let payload = json!({ "job": name.as_str(), "event": "fire" });
        tokio::spawn(async move {
                let _ = audit.emit(now_ms, AuditEventKind::JobFire, actor, payload).await;
        });
    }

    fn emit_finish(&self, name: &JobName, event: &str, now_ms: u64) {
        let audit = self.audit.clone();
        let actor = name.as_str().to_string();
        let payload = json!({ "job": name.as_str(), "event": event });
        tokio::spawn(async move {
                let _ = audit.emit(now_ms, AuditEventKind::JobFinish, actor, payload).await;
        });
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
