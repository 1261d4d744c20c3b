// SPDX-License-Identifier: MIT

//! Exponential backoff between automatic restarts:
//! `min(base * 2^consecutive_failures, cap)`.

use std::time::Duration;

pub const DEFAULT_BASE: Duration = Duration::from_millis(500);
pub const DEFAULT_CAP: Duration = Duration::from_secs(60);

pub fn next_delay(consecutive_failures: u32, base: Duration, cap: Duration) -> Duration {
    if consecutive_failures >= 32 {
        return cap;
    }
    let factor: u32 = 1 << consecutive_failures;
    base.checked_mul(factor).unwrap_or(cap).min(cap)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
