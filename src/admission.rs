// src/admission.rs

// admission-gate: concurrency gating for the scarce upstream AI session.

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::AdmissionConfig;
use crate::errors::GateError;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

// booked slots are promised a fixed offset after the booking time
const BOOKING_OFFSET_MS: u64 = 30 * 60 * 1000;

/// One admitted upstream session.
#[derive(Debug, Clone)]
struct ActiveSession {
    owner_ref: String,
    started_at_ms: u64,
}

/// A promise to notify a client by email of a future slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailBooking {
    pub ticket_id: String,
    pub email: String,
    /// Booking time, milliseconds since the Unix epoch
    pub booked_at_ms: u64,
    /// Promised slot, milliseconds since the Unix epoch
    pub scheduled_slot_utc: u64,
}

/// Gates concurrent access to the upstream AI resource.
///
/// Owns three collections outright: the active-session table, the FIFO
/// waiting queue of ticket ids, and the email-booking store. Each sits behind
/// its own mutex; critical sections are tiny and never block on I/O.
///
/// Abandoned sessions are reclaimed lazily at the start of every
/// capacity-touching call, never by a background timer. A client that holds a
/// slot without releasing it occupies the slot until `session_timeout_ms`
/// elapses.
#[derive(Debug)]
pub struct AdmissionController<C = SystemClock>
where
    C: Clock,
{
    config: AdmissionConfig,
    sessions: Mutex<HashMap<String, ActiveSession>>,
    queue: Mutex<VecDeque<String>>,
    bookings: Mutex<VecDeque<EmailBooking>>,
    clock: C,
}

// methods for the AdmissionController type
impl<C> AdmissionController<C>
where
    C: Clock,
{
    // method to create a new controller from a validated config object
    pub fn with_config(config: AdmissionConfig, clock: C) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            bookings: Mutex::new(VecDeque::new()),
            clock,
        })
    }

    // accessor method to return the concurrency ceiling
    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    /// Try to admit a new upstream session for `owner_ref`.
    ///
    /// Returns `Ok(None)` when the ceiling is reached; that is backpressure,
    /// not an error. With the queue disabled every call succeeds with a fresh
    /// id and no capacity is reserved (fire-and-forget mode).
    pub fn acquire_slot(&self, owner_ref: &str) -> Result<Option<String>, GateError> {
        let now_ms = self.clock.now_ms()?;
        let mut sessions = lock(&self.sessions);
        reclaim_stale(&mut sessions, now_ms, self.config.session_timeout_ms);

        if !self.config.queue_enabled {
            return Ok(Some(mint_id()));
        }
        if sessions.len() >= self.config.max_concurrent {
            debug!(
                active = sessions.len(),
                max = self.config.max_concurrent,
                "admission denied, ceiling reached"
            );
            return Ok(None);
        }

        let session_id = mint_id();
        sessions.insert(
            session_id.clone(),
            ActiveSession {
                owner_ref: owner_ref.to_string(),
                started_at_ms: now_ms,
            },
        );
        debug!(%session_id, owner_ref, "session admitted");
        Ok(Some(session_id))
    }

    /// Release an admitted session. Idempotent: an unknown or already-released
    /// id is a no-op, never an error.
    pub fn release_slot(&self, session_id: &str) {
        let mut sessions = lock(&self.sessions);
        if sessions.remove(session_id).is_some() {
            debug!(%session_id, "session released");
        }
    }

    /// Read-only capacity snapshot, taken after stale-session cleanup.
    /// Never mutates the waiting queue.
    pub fn capacity_status(&self) -> Result<CapacityStatus, GateError> {
        let now_ms = self.clock.now_ms()?;
        let mut sessions = lock(&self.sessions);
        reclaim_stale(&mut sessions, now_ms, self.config.session_timeout_ms);
        let active_count = sessions.len();
        drop(sessions);

        Ok(CapacityStatus {
            active_count,
            max_concurrent: self.config.max_concurrent,
            queue_length: lock(&self.queue).len(),
            queue_enabled: self.config.queue_enabled,
        })
    }

    /// Check whether a slot is free right now and mint a wait ticket.
    ///
    /// When no slot is free the ticket joins the FIFO queue and the caller
    /// gets its 1-based position plus a wait estimate. The position is
    /// advisory: it is recomputed per call and never reserved, so two callers
    /// may both see the same position.
    pub fn check_availability(&self) -> Result<Availability, GateError> {
        let now_ms = self.clock.now_ms()?;
        let mut sessions = lock(&self.sessions);
        reclaim_stale(&mut sessions, now_ms, self.config.session_timeout_ms);
        let active_count = sessions.len();
        drop(sessions);

        let available = !self.config.queue_enabled || active_count < self.config.max_concurrent;
        let ticket_id = mint_id();

        if available {
            return Ok(Availability {
                available: true,
                ticket_id,
                queue_position: 0,
                estimated_wait_ms: 0,
            });
        }

        let mut queue = lock(&self.queue);
        queue.push_back(ticket_id.clone());
        let queue_position = queue.len();
        while queue.len() > self.config.max_queue_length {
            queue.pop_front();
            debug!("waiting queue trimmed, oldest ticket dropped");
        }
        drop(queue);

        let estimated_wait_ms = (queue_position as u64 * self.config.avg_session_duration_ms)
            .div_ceil(self.config.max_concurrent as u64);
        Ok(Availability {
            available: false,
            ticket_id,
            queue_position,
            estimated_wait_ms,
        })
    }

    /// Store a promise to email `email` about a future slot, correlated by
    /// the caller-supplied `ticket_id`.
    ///
    /// Validation is deliberately minimal: the email must contain `@` and the
    /// ticket id must be non-empty. A booking with an existing ticket id
    /// replaces the prior one; past the store bound the single oldest booking
    /// is evicted.
    pub fn book_email_slot(&self, email: &str, ticket_id: &str) -> Result<BookingReceipt, GateError> {
        if ticket_id.is_empty() {
            return Err(GateError::MissingTicketId);
        }
        if !email.contains('@') {
            return Err(GateError::InvalidEmail);
        }

        let now_ms = self.clock.now_ms()?;
        let scheduled_slot_utc = now_ms + BOOKING_OFFSET_MS;

        let mut bookings = lock(&self.bookings);
        bookings.retain(|b| b.ticket_id != ticket_id);
        bookings.push_back(EmailBooking {
            ticket_id: ticket_id.to_string(),
            email: email.to_string(),
            booked_at_ms: now_ms,
            scheduled_slot_utc,
        });
        if bookings.len() > self.config.max_bookings {
            bookings.pop_front();
        }
        drop(bookings);

        debug!(ticket_id, "email slot booked");
        Ok(BookingReceipt {
            booked: true,
            scheduled_slot_utc,
        })
    }

    /// Look up a stored booking by ticket id
    pub fn booking(&self, ticket_id: &str) -> Option<EmailBooking> {
        lock(&self.bookings)
            .iter()
            .find(|b| b.ticket_id == ticket_id)
            .cloned()
    }

    /// Number of bookings currently stored
    pub fn booking_count(&self) -> usize {
        lock(&self.bookings).len()
    }
}

/// Snapshot of current occupancy for the capacity endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityStatus {
    pub active_count: usize,
    pub max_concurrent: usize,
    pub queue_length: usize,
    pub queue_enabled: bool,
}

/// Outcome of an availability check, with queue ticket and wait estimate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub ticket_id: String,
    /// 1-based queue position; 0 when a slot is free
    pub queue_position: usize,
    pub estimated_wait_ms: u64,
}

/// Confirmation body for a successful booking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub booked: bool,
    /// Promised slot, milliseconds since the Unix epoch
    pub scheduled_slot_utc: u64,
}

fn mint_id() -> String {
    Uuid::new_v4().to_string()
}

// a poisoned mutex only means another thread panicked mid-update of a tiny
// critical section; the data is still usable, so keep serving
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn reclaim_stale(sessions: &mut HashMap<String, ActiveSession>, now_ms: u64, timeout_ms: u64) {
    let before = sessions.len();
    sessions.retain(|_, session| now_ms.saturating_sub(session.started_at_ms) <= timeout_ms);
    let reclaimed = before - sessions.len();
    if reclaimed > 0 {
        debug!(reclaimed, "stale sessions reclaimed");
    }
}
