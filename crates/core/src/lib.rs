// SPDX-License-Identifier: MIT

//! Shared data model for the Perpetual Enforcement & Recursive Improvement Engine.
//!
//! Every long-lived type that crosses a crate boundary — `ManagedProcess`,
//! `Job`, `ThresholdSet`, `MetricSample`, `Verdict`, `CycleState`,
//! `CommandIntent` — lives here as a plain serde-friendly struct or enum, so
//! that `umcc-supervisor`, `umcc-scheduler`, `umcc-probe`, `umcc-evaluator`
//! and `umcc-dispatcher` share one vocabulary without depending on each
//! other.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod cycle;
pub mod error;
pub mod id;
pub mod job;
pub mod metrics;
pub mod process;
pub mod threshold;
pub mod verdict;

pub use clock::{AnyClock, Clock, FakeClock, SystemClock};
pub use cycle::{CycleState, DEFAULT_SCALE_FACTOR};
pub use error::ErrorKind;
pub use id::{IdGen, JobName, ProcessName, ShortId, UuidIdGen};
pub use job::{JobRunOutcome, JobRuntime, JobSpec, OverlapPolicy};
pub use metrics::{MetricSample, Reading};
pub use process::{ProcessSnapshot, ProcessSpec, ProcessState, ReadinessProbe};
pub use threshold::{Threshold, ThresholdKind, ThresholdSet};
pub use verdict::{Breach, Verdict, VerdictClass};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock as TestClock;
