// src/config.rs

//! Configuration types for the admission gate

// dependencies
use std::env;

use crate::errors::GateError;

// environment variables consumed by `AdmissionConfig::from_env`
const ENV_MAX_CONCURRENT: &str = "MAX_CONCURRENT_GEMINI_SESSIONS";
const ENV_AVG_SESSION_DURATION: &str = "AVG_SESSION_DURATION_MS";
const ENV_QUEUE_ENABLED: &str = "QUEUE_ENABLED";

/// Configuration for the admission controller.
///
/// All knobs are fixed at startup; the controller never re-reads them.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub(crate) max_concurrent: usize,
    pub(crate) avg_session_duration_ms: u64,
    pub(crate) queue_enabled: bool,
    pub(crate) session_timeout_ms: u64,
    pub(crate) max_queue_length: usize,
    pub(crate) max_bookings: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            avg_session_duration_ms: 5 * 60 * 1000,
            queue_enabled: true,
            session_timeout_ms: 10 * 60 * 1000,
            max_queue_length: 100,
            max_bookings: 100,
        }
    }
}

impl AdmissionConfig {
    /// Create a configuration with the three primary knobs; the queue and
    /// booking bounds keep their defaults.
    pub fn new(max_concurrent: usize, avg_session_duration_ms: u64, queue_enabled: bool) -> Self {
        Self {
            max_concurrent,
            avg_session_duration_ms,
            queue_enabled,
            ..Self::default()
        }
    }

    /// Read overrides from the environment on top of the defaults.
    /// Unset variables keep their default; a set-but-unparsable variable is an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self, GateError> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(ENV_MAX_CONCURRENT) {
            config.max_concurrent = raw.parse().map_err(|_| GateError::InvalidEnvVar {
                name: ENV_MAX_CONCURRENT,
                value: raw,
            })?;
        }
        if let Ok(raw) = env::var(ENV_AVG_SESSION_DURATION) {
            config.avg_session_duration_ms = raw.parse().map_err(|_| GateError::InvalidEnvVar {
                name: ENV_AVG_SESSION_DURATION,
                value: raw,
            })?;
        }
        if let Ok(raw) = env::var(ENV_QUEUE_ENABLED) {
            config.queue_enabled = parse_bool(&raw).ok_or(GateError::InvalidEnvVar {
                name: ENV_QUEUE_ENABLED,
                value: raw,
            })?;
        }
        Ok(config)
    }

    /// Builder-style: set the concurrency ceiling
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Builder-style: set the average session duration used for wait estimates
    pub fn avg_session_duration_ms(mut self, avg_session_duration_ms: u64) -> Self {
        self.avg_session_duration_ms = avg_session_duration_ms;
        self
    }

    /// Builder-style: enable or disable the admission queue entirely
    pub fn queue_enabled(mut self, queue_enabled: bool) -> Self {
        self.queue_enabled = queue_enabled;
        self
    }

    /// Builder-style: set the abandoned-session timeout
    pub fn session_timeout_ms(mut self, session_timeout_ms: u64) -> Self {
        self.session_timeout_ms = session_timeout_ms;
        self
    }

    /// Builder-style: set the waiting-queue bound
    pub fn max_queue_length(mut self, max_queue_length: usize) -> Self {
        self.max_queue_length = max_queue_length;
        self
    }

    /// Builder-style: set the booking-store bound
    pub fn max_bookings(mut self, max_bookings: usize) -> Self {
        self.max_bookings = max_bookings;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_concurrent == 0 {
            return Err(GateError::InvalidMaxConcurrent);
        }
        if self.avg_session_duration_ms == 0 {
            return Err(GateError::InvalidAvgSessionDuration);
        }
        if self.session_timeout_ms == 0 {
            return Err(GateError::InvalidSessionTimeout);
        }
        Ok(())
    }
}

/// Configuration for one sliding-window limiter instance: a request ceiling
/// over a fixed window.
#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    pub(crate) max_requests: u32,
    pub(crate) window_ms: u64,
}

impl LimiterConfig {
    /// Create a new configuration with ceiling and window settings
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    /// Builder-style: set the request ceiling
    pub fn max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Builder-style: set the window duration
    pub fn window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_requests == 0 {
            return Err(GateError::InvalidMaxRequests);
        }
        if self.window_ms == 0 {
            return Err(GateError::InvalidWindow);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
