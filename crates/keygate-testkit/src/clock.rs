//! Simulated clock for deterministic expiry tests

use keygate_core::ClockSource;
use parking_lot::Mutex;
use std::sync::Arc;

/// Fixed start time used by most tests: 2024-01-01T00:00:00Z
pub const TEST_EPOCH_MS: u64 = 1_704_067_200_000;

/// Settable clock shared across clones
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    current: Arc<Mutex<u64>>,
}

impl SimulatedClock {
    /// Create a clock reading `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Advance the clock by `ms`
    pub fn advance(&self, ms: u64) {
        *self.current.lock() += ms;
    }

    /// Set the absolute time
    pub fn set(&self, ms: u64) {
        *self.current.lock() = ms;
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(TEST_EPOCH_MS)
    }
}

impl ClockSource for SimulatedClock {
    fn now_ms(&self) -> u64 {
        *self.current.lock()
    }
}
