// src/errors.rs

// error handling for the admission gate

// dependencies
use thiserror::Error;

use crate::clock::ClockError;

/// Error type for the admission gate.
///
/// Backpressure (a full ceiling, an exhausted window) is never an error; it is
/// reported in-band by `acquire_slot` returning `None` and by
/// `Decision::allowed` being false. `GateError` covers caller mistakes and
/// environment faults only.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GateError {
    #[error("maxConcurrent must be greater than zero")]
    InvalidMaxConcurrent,
    #[error("avgSessionDurationMs must be greater than zero")]
    InvalidAvgSessionDuration,
    #[error("sessionTimeoutMs must be greater than zero")]
    InvalidSessionTimeout,
    #[error("maxRequests must be greater than zero")]
    InvalidMaxRequests,
    #[error("windowMs must be greater than zero")]
    InvalidWindow,
    #[error("email address is invalid")]
    InvalidEmail,
    #[error("ticket id is required")]
    MissingTicketId,
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnvVar { name: &'static str, value: String },
    #[error("clock error occurred")]
    Clock(#[from] ClockError),
}

impl GateError {
    /// True for the validation failures a router should map to a 400 response.
    pub fn is_validation(&self) -> bool {
        matches!(self, GateError::InvalidEmail | GateError::MissingTicketId)
    }
}
