//! Element resolution over single locators and fallback chains.
//!
//! Each locator in a chain gets the full timeout; the worst case is
//! `timeout * chain length`. Callers that need a quick bail-out probe with
//! [`Resolver::first_present`] and a short timeout before committing.

use crate::locator::{Locator, Target};
use crate::result::{ProbeError, ProbeResult};
use crate::session::{DeviceSession, ElementHandle};
use crate::wait::{poll, Condition, WaitOptions, DEFAULT_POLL_INTERVAL_MS};
use std::time::{Duration, Instant};

/// Finds elements for page actions
#[derive(Clone, Copy)]
pub struct Resolver<'s> {
    session: &'s dyn DeviceSession,
    poll_interval_ms: u64,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish_non_exhaustive()
    }
}

impl<'s> Resolver<'s> {
    /// Resolver over a session
    #[must_use]
    pub fn new(session: &'s dyn DeviceSession) -> Self {
        Self {
            session,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// The session this resolver queries
    #[must_use]
    pub fn session(&self) -> &'s dyn DeviceSession {
        self.session
    }

    fn options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::within(timeout).with_poll_interval(self.poll_interval_ms)
    }

    /// Resolve `target` under `condition`, trying chain members left to right.
    ///
    /// Shape errors surface as [`ProbeError::InvalidLocator`] before any device
    /// call; an exhausted chain as [`ProbeError::NotFound`] listing every locator.
    pub fn resolve(
        &self,
        target: impl Into<Target>,
        condition: Condition,
        timeout: Duration,
    ) -> ProbeResult<ElementHandle> {
        let target = target.into();
        target.validate()?;
        let options = self.options(timeout);
        let total = target.locators().len();

        for (index, locator) in target.locators().iter().enumerate() {
            let started = Instant::now();
            let waited_for = format!("{locator} to be {}", condition.describe());
            match poll(&options, &waited_for, || condition.probe(self.session, locator)) {
                Ok(result) => {
                    tracing::debug!(
                        attempt = index + 1,
                        of = total,
                        %locator,
                        elapsed = ?result.elapsed,
                        polls = result.attempts,
                        "resolved"
                    );
                    return Ok(result.value);
                }
                Err(ProbeError::Timeout { last_error, .. }) => {
                    tracing::debug!(
                        attempt = index + 1,
                        of = total,
                        %locator,
                        elapsed = ?started.elapsed(),
                        last_error = last_error.as_deref().unwrap_or("-"),
                        "locator did not resolve"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(%target, condition = condition.describe(), "fallback chain exhausted");
        Err(ProbeError::NotFound {
            attempted: target.locators().to_vec(),
        })
    }

    /// Resolve with the presence condition
    pub fn find(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<ElementHandle> {
        self.resolve(target, Condition::Present, timeout)
    }

    /// Whether `target` becomes present within `timeout`.
    ///
    /// Invalid locators are logged and reported as absent.
    pub fn is_present(&self, target: impl Into<Target>, timeout: Duration) -> bool {
        match self.find(target, timeout) {
            Ok(_) => true,
            Err(e @ ProbeError::InvalidLocator { .. }) => {
                tracing::error!(error = %e, "presence check with invalid locator");
                false
            }
            Err(_) => false,
        }
    }

    /// Index of the first locator present within `timeout` each
    pub fn first_present(&self, locators: &[Locator], timeout: Duration) -> Option<usize> {
        locators
            .iter()
            .position(|locator| self.is_present(locator, timeout))
    }
}
