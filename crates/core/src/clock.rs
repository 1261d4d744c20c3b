// SPDX-License-Identifier: MIT

//! Clock abstraction so scheduling and audit timestamps are deterministic in tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of wall-clock and monotonic time for every timestamped operation.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for deadlines and cadences.
    fn now(&self) -> Instant;
    /// Wall-clock milliseconds since the Unix epoch, used for audit timestamps.
    fn epoch_ms(&self) -> u64;
}

/// Real clock backed by the OS.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
    }
}

/// Deterministic clock for tests: `now()` and `epoch_ms()` only advance when
/// [`FakeClock::advance`] is called.
#[derive(Debug, Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

#[derive(Debug)]
struct FakeClockState {
    now: Instant,
    epoch_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                        now: Instant::now(),
                        epoch_ms: 0,
            })),
        }
    }

    pub fn advance(&self, d: Duration) {
        let mut state = self.inner.lock();
        state.now += d;
        state.epoch_ms += d.as_millis() as u64;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

/// Runtime-selected clock so components that are spawned generically
/// (one tokio task per process or per job) can hold a single concrete type
/// instead of a trait object — `Clock` requires `Clone`, which rules out
/// `dyn Clock`.
#[derive(Debug, Clone)]
pub enum AnyClock {
    System(SystemClock),
    Fake(FakeClock),
}

impl Clock for AnyClock {
    fn now(&self) -> Instant {
        match self {
            AnyClock::System(c) => c.now(),
            AnyClock::Fake(c) => c.now(),
        }
    }

    fn epoch_ms(&self) -> u64 {
        match self {
            AnyClock::System(c) => c.epoch_ms(),
            AnyClock::Fake(c) => c.epoch_ms(),
        }
    }
}

impl From<SystemClock> for AnyClock {
    fn from(c: SystemClock) -> Self {
        AnyClock::System(c)
    }
}

impl From<FakeClock> for AnyClock {
    fn from(c: FakeClock) -> Self {
        AnyClock::Fake(c)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
