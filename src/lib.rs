// src/lib.rs

//! # Admission Gate
//!
//! Admission control and fixed-window rate limiting for a service fronting a
//! scarce generative-AI upstream.
//!
//! Two independent, process-local components:
//!
//! - [`AdmissionController`] bounds concurrent upstream sessions, reclaims
//!   abandoned ones by timeout, mints FIFO wait tickets with position/wait
//!   estimates, and stores "email me a slot" bookings.
//! - [`SlidingWindowLimiter`] bounds the request rate of a client key within
//!   a fixed window; [`RouteLimiter`], [`TieredLimiter`] and [`LoginLimiter`]
//!   layer the usual policies on top of it.
//!
//! Backpressure is always in-band: a full ceiling is `Ok(None)`, an exhausted
//! window is a [`Decision`] with `allowed: false`. `Err` is reserved for
//! caller mistakes and clock faults.
//!
//! ## Quick Example
//!
//! ```rust
//! use admission_gate::{AdmissionConfig, AdmissionController, SystemClock};
//!
//! let config = AdmissionConfig::new(2, 300_000, true);
//! let gate = AdmissionController::with_config(config, SystemClock).unwrap();
//!
//! match gate.acquire_slot("browser-session-1").unwrap() {
//!     Some(session_id) => {
//!         // ... run the upstream session ...
//!         gate.release_slot(&session_id);
//!     }
//!     None => {
//!         let wait = gate.check_availability().unwrap();
//!         println!("queued at position {}", wait.queue_position);
//!     }
//! }
//! ```

// private modules
mod admission;
mod clock;
mod config;
mod errors;
mod limiter;
mod policy;
mod sweep;

// public API exports
pub use admission::{AdmissionController, Availability, BookingReceipt, CapacityStatus, EmailBooking};
pub use clock::{Clock, ClockError, SystemClock};
pub use config::{AdmissionConfig, LimiterConfig};
pub use errors::GateError;
pub use limiter::{Decision, RateLimitRejection, SlidingWindowLimiter};
pub use policy::{CallerClass, LoginLimiter, RouteLimiter, TieredLimiter};
pub use sweep::{DEFAULT_SWEEP_PERIOD, Sweep, Sweeper};
