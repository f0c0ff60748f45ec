// src/limiter.rs

// admission-gate: fixed-window rate limiting keyed by an opaque client key.

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;
use crate::errors::GateError;
use dashmap::DashMap;
use serde::Serialize;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// One window counter: requests seen so far and the instant the window ends.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at_ms: u64,
}

/// The sliding-window limiter.
/// T is the type used to identify clients (e.g., String, u64, etc.).
/// C is the clock type, defaulting to SystemClock.
/// We use `Arc<DashMap>` for thread-safe concurrent access to per-key windows.
///
/// Windows are fixed, not rolling: the counter resets once the window has
/// fully elapsed, so a burst straddling a boundary can admit up to twice the
/// ceiling across the boundary. That trade-off buys O(1) memory and work per
/// key.
#[derive(Debug)]
pub struct SlidingWindowLimiter<T = String, C = SystemClock>
where
    T: Hash + Eq + Clone,
    C: Clock,
{
    max_requests: u32,
    window_ms: u64,
    windows: Arc<DashMap<T, WindowEntry>>,
    clock: C,
}

// methods for the SlidingWindowLimiter type
impl<T, C> SlidingWindowLimiter<T, C>
where
    T: Hash + Eq + Clone,
    C: Clock,
{
    // method to create a new limiter from a validated config object
    pub fn with_config(config: LimiterConfig, clock: C) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self {
            max_requests: config.max_requests,
            window_ms: config.window_ms,
            windows: Arc::new(DashMap::new()),
            clock,
        })
    }

    // accessor method to return the request ceiling
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    // accessor method to return the window duration
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Count one request against `key` and decide whether it may proceed.
    ///
    /// The window is rolled lazily: if the previous window has fully elapsed
    /// the counter restarts at zero before the increment. A denied request is
    /// a backpressure signal, not an error; `Err` is reserved for clock
    /// failure.
    pub fn check(&self, key: T) -> Result<Decision, GateError> {
        let now_ms = self.clock.now_ms()?;

        let mut entry = self.windows.entry(key).or_insert(WindowEntry {
            count: 0,
            reset_at_ms: now_ms + self.window_ms,
        });
        if now_ms > entry.reset_at_ms {
            entry.count = 0;
            entry.reset_at_ms = now_ms + self.window_ms;
        }
        entry.count += 1;
        let count = entry.count;
        let reset_at_ms = entry.reset_at_ms;
        drop(entry);

        if count > self.max_requests {
            let retry_after_seconds = reset_at_ms.saturating_sub(now_ms).div_ceil(1000);
            debug!(retry_after_seconds, "request over window ceiling");
            Ok(Decision {
                allowed: false,
                retry_after_seconds: Some(retry_after_seconds),
                remaining: 0,
                reset_at_ms: Some(reset_at_ms),
            })
        } else {
            Ok(Decision {
                allowed: true,
                retry_after_seconds: None,
                remaining: self.max_requests - count,
                reset_at_ms: Some(reset_at_ms),
            })
        }
    }

    /// Drop every window that has already elapsed, bounding memory to keys
    /// seen within the current windows. Returns the number of keys removed.
    pub fn sweep_expired(&self) -> Result<usize, GateError> {
        let now_ms = self.clock.now_ms()?;
        // checks insert concurrently, so count removals in the closure rather
        // than diffing map sizes
        let mut removed = 0;
        self.windows.retain(|_, entry| {
            let keep = entry.reset_at_ms >= now_ms;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(removed, "swept expired rate-limit windows");
        }
        Ok(removed)
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// Result of a rate limiting decision with metadata for HTTP responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether the request should be allowed
    pub allowed: bool,
    /// Whole seconds until the window resets (when denied)
    pub retry_after_seconds: Option<u64>,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends (milliseconds since the Unix epoch).
    /// `None` when no window was consulted, e.g. an email-less login check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at_ms: Option<u64>,
}

impl Decision {
    pub(crate) fn pass(remaining: u32) -> Self {
        Self {
            allowed: true,
            retry_after_seconds: None,
            remaining,
            reset_at_ms: None,
        }
    }

    /// The 429 response body for a denied request, or `None` when allowed.
    pub fn rejection(&self) -> Option<RateLimitRejection> {
        if self.allowed {
            return None;
        }
        Some(RateLimitRejection {
            error: "Too many requests, please try again later".to_string(),
            code: "RATE_LIMITED".to_string(),
            retry_after: self.retry_after_seconds.unwrap_or(0),
        })
    }

    /// Value for the `Retry-After` header, or `None` when allowed.
    pub fn retry_after_header(&self) -> Option<String> {
        self.retry_after_seconds.map(|s| s.to_string())
    }
}

/// JSON body paired with a 429 status and a `Retry-After` header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRejection {
    pub error: String,
    pub code: String,
    pub retry_after: u64,
}
