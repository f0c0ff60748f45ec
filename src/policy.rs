// src/policy.rs

// admission-gate: rate-limit policies layered on the sliding-window primitive.

// dependencies
use crate::clock::{Clock, SystemClock};
use crate::config::LimiterConfig;
use crate::errors::GateError;
use crate::limiter::{Decision, SlidingWindowLimiter};

// login brute-force protection: 5 attempts per 15 minutes
const LOGIN_MAX_ATTEMPTS: u32 = 5;
const LOGIN_WINDOW_MS: u64 = 15 * 60 * 1000;

/// Per-route limiter: one ceiling/window pair applied to a protected route,
/// keyed by client address plus route scope.
#[derive(Debug)]
pub struct RouteLimiter<C = SystemClock>
where
    C: Clock,
{
    inner: SlidingWindowLimiter<String, C>,
}

impl<C> RouteLimiter<C>
where
    C: Clock,
{
    pub fn with_config(config: LimiterConfig, clock: C) -> Result<Self, GateError> {
        Ok(Self {
            inner: SlidingWindowLimiter::with_config(config, clock)?,
        })
    }

    pub fn check(&self, client_addr: &str, route_scope: &str) -> Result<Decision, GateError> {
        self.inner.check(format!("{client_addr}:{route_scope}"))
    }

    pub fn sweep_expired(&self) -> Result<usize, GateError> {
        self.inner.sweep_expired()
    }
}

/// How the external credential-verification collaborator classified the
/// caller. The core never inspects credentials itself; it only consumes the
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerClass {
    Authenticated,
    Anonymous,
}

/// Tiered limiter: authenticated callers get one ceiling/window pair,
/// anonymous callers another. Two independent limiter instances, selected by
/// classification; the tiers never share window state.
#[derive(Debug)]
pub struct TieredLimiter<C = SystemClock>
where
    C: Clock,
{
    authenticated: SlidingWindowLimiter<String, C>,
    anonymous: SlidingWindowLimiter<String, C>,
}

impl<C> TieredLimiter<C>
where
    C: Clock + Clone,
{
    pub fn with_config(
        authenticated: LimiterConfig,
        anonymous: LimiterConfig,
        clock: C,
    ) -> Result<Self, GateError> {
        Ok(Self {
            authenticated: SlidingWindowLimiter::with_config(authenticated, clock.clone())?,
            anonymous: SlidingWindowLimiter::with_config(anonymous, clock)?,
        })
    }
}

// only construction clones the clock; checking and sweeping need no such bound
impl<C> TieredLimiter<C>
where
    C: Clock,
{
    pub fn check(&self, class: CallerClass, identity: &str) -> Result<Decision, GateError> {
        match class {
            CallerClass::Authenticated => self.authenticated.check(identity.to_string()),
            CallerClass::Anonymous => self.anonymous.check(identity.to_string()),
        }
    }

    pub fn sweep_expired(&self) -> Result<usize, GateError> {
        Ok(self.authenticated.sweep_expired()? + self.anonymous.sweep_expired()?)
    }
}

/// Login brute-force limiter: 5 attempts per 15 minutes, keyed on the
/// *claimed* email rather than the source address, so repeated guesses
/// against one account are throttled regardless of origin IP.
#[derive(Debug)]
pub struct LoginLimiter<C = SystemClock>
where
    C: Clock,
{
    inner: SlidingWindowLimiter<String, C>,
}

impl<C> LoginLimiter<C>
where
    C: Clock,
{
    pub fn new(clock: C) -> Result<Self, GateError> {
        Ok(Self {
            inner: SlidingWindowLimiter::with_config(
                LimiterConfig::new(LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW_MS),
                clock,
            )?,
        })
    }

    /// A request without an email cannot be a login attempt worth protecting,
    /// so it always passes.
    pub fn check(&self, email: Option<&str>) -> Result<Decision, GateError> {
        match email {
            Some(email) => self.inner.check(format!("login:{email}")),
            None => Ok(Decision::pass(LOGIN_MAX_ATTEMPTS)),
        }
    }

    pub fn sweep_expired(&self) -> Result<usize, GateError> {
        self.inner.sweep_expired()
    }
}
