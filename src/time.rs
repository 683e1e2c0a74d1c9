//! Injectable monotonic clock.
//!
//! The Await Engine reads elapsed time through this seam rather than calling
//! [`std::time::Instant::now`] directly, so timeout bookkeeping can be
//! exercised with a controlled clock in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic-enough millisecond source for timeout accounting.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since some arbitrary, clock-specific epoch.
    fn now_ms(&self) -> u64;
}

/// The production clock: wall time since this instance was created.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A manually-advanced clock for deterministic budget-math tests.
pub struct MockClock {
    millis: AtomicU64,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            millis: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_advances_on_demand() {
        let clock = MockClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.advance(42);
        assert_eq!(clock.now_ms(), 42);
    }
}
