//! Clock source
//!
//! All expiry decisions read time through [`ClockSource`] so tests can pin and
//! advance it. Values are Unix epoch milliseconds.
//!
//! Only the production handler lives here; the simulated clock belongs in
//! `keygate-testkit`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current wall-clock time
pub trait ClockSource: Send + Sync {
    /// Current Unix timestamp in milliseconds
    fn now_ms(&self) -> u64;

    /// Current Unix timestamp in seconds
    fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }
}

/// Real clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock
    pub fn new() -> Self {
        Self
    }
}

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

impl<T: ClockSource + ?Sized> ClockSource for std::sync::Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Values below this are taken to be seconds rather than milliseconds
const MILLIS_THRESHOLD: u64 = 1_000_000_000_000;

/// Normalize an epoch timestamp that may be in seconds or milliseconds
pub fn normalize_epoch_millis(value: u64) -> u64 {
    if value < MILLIS_THRESHOLD {
        value.saturating_mul(1000)
    } else {
        value
    }
}
