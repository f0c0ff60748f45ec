// src/sweep.rs

// admission-gate: periodic garbage collection of elapsed rate-limit windows.

// dependencies
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::errors::GateError;
use crate::limiter::SlidingWindowLimiter;
use crate::policy::{LoginLimiter, RouteLimiter, TieredLimiter};

/// Default sweep period: every 5 minutes
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Anything whose elapsed entries a [`Sweeper`] can drop periodically.
pub trait Sweep: Send + Sync {
    fn sweep_expired(&self) -> Result<usize, GateError>;
}

impl<T, C> Sweep for SlidingWindowLimiter<T, C>
where
    T: Hash + Eq + Clone + Send + Sync,
    C: Clock,
{
    fn sweep_expired(&self) -> Result<usize, GateError> {
        SlidingWindowLimiter::sweep_expired(self)
    }
}

impl<C: Clock> Sweep for RouteLimiter<C> {
    fn sweep_expired(&self) -> Result<usize, GateError> {
        RouteLimiter::sweep_expired(self)
    }
}

impl<C: Clock> Sweep for TieredLimiter<C> {
    fn sweep_expired(&self) -> Result<usize, GateError> {
        TieredLimiter::sweep_expired(self)
    }
}

impl<C: Clock> Sweep for LoginLimiter<C> {
    fn sweep_expired(&self) -> Result<usize, GateError> {
        LoginLimiter::sweep_expired(self)
    }
}

/// Handle to the background sweep task.
///
/// The task ticks on a fixed period and never blocks request handling; all it
/// does is drop elapsed windows. [`shutdown`](Self::shutdown) stops the task
/// and waits for it; dropping the handle also stops it at its next poll, so
/// the task never outlives its owner.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweep task over `target`, ticking every `period`.
    /// Must be called from within a tokio runtime.
    pub fn spawn(target: Arc<dyn Sweep>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match target.sweep_expired() {
                            Ok(removed) if removed > 0 => {
                                debug!(removed, "background sweep dropped elapsed windows");
                            }
                            Ok(_) => {}
                            Err(error) => warn!(%error, "background sweep skipped"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        Self { shutdown_tx, task }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Whether the task has already finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
