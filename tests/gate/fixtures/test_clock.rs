// tests/gate/fixtures/test_clock.rs

// dependencies
use admission_gate::{Clock, ClockError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// Test clock implementation
#[derive(Debug, Clone)]
pub struct TestClock {
    time_ms: Arc<AtomicU64>,
    should_fail: Arc<AtomicBool>,
}

impl TestClock {
    pub fn new(initial_ms: u64) -> Self {
        Self {
            time_ms: Arc::new(AtomicU64::new(initial_ms)),
            should_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set_ms(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::Relaxed);
    }

    // Make the next call to `now_ms()` return an error
    pub fn fail_next_call(&self) {
        self.should_fail.store(true, Ordering::Relaxed);
    }

    // Helper to read the current test time
    pub fn current_ms(&self) -> u64 {
        self.time_ms.load(Ordering::Relaxed)
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        if self.should_fail.swap(false, Ordering::Relaxed) {
            Err(ClockError::SystemTimeError)
        } else {
            Ok(self.time_ms.load(Ordering::Relaxed))
        }
    }
}
