// src/clock.rs

// clock module definition and implementations

// dependencies
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync).
/// The `now_ms` method returns the current time in milliseconds since the Unix
/// epoch; the whole core thinks in milliseconds, matching the window and
/// timeout configuration units.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Result<u64, ClockError>;
}

/// Clock error type
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("system time is before the Unix epoch")]
    SystemTimeError,
}

/// SystemClock implementation using the system time.
/// Returns the current time in milliseconds since the Unix epoch.
/// Thread-safe and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Result<u64, ClockError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|_| ClockError::SystemTimeError)
    }
}
