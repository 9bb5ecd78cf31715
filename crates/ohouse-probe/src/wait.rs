//! Condition polling.
//!
//! Every wait in the suite is the same loop: evaluate a probe against the
//! device, return as soon as it yields a value, otherwise sleep one interval
//! and try again until the wall-clock deadline. A slow device call can overrun
//! the nominal budget; nothing interrupts an in-flight request.

use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{DeviceSession, ElementHandle};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default interval, given timeout
    #[must_use]
    pub fn within(timeout: Duration) -> Self {
        Self::default().with_timeout(timeout.as_millis() as u64)
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// A satisfied wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult<T> {
    /// Value produced by the probe
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probe evaluations
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

impl<T> WaitResult<T> {
    /// Consume the result, keeping the value
    pub fn into_value(self) -> T {
        self.value
    }
}

// =============================================================================
// POLL LOOP
// =============================================================================

/// Evaluate `probe` until it yields `Some`, or fail with [`ProbeError::Timeout`].
///
/// Transient probe errors count as "not yet". Non-transient ones
/// (see [`ProbeError::is_transient`]) end the wait immediately.
pub fn poll<T, F>(options: &WaitOptions, waited_for: &str, mut probe: F) -> ProbeResult<WaitResult<T>>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut attempts = 0_u32;
    let mut last_error = None;

    loop {
        attempts += 1;
        match probe() {
            Ok(Some(value)) => {
                return Ok(WaitResult {
                    value,
                    elapsed: start.elapsed(),
                    attempts,
                    waited_for: waited_for.to_string(),
                })
            }
            Ok(None) => {}
            Err(e) if e.is_transient() => {
                tracing::trace!(waited_for, error = %e, "probe not satisfied");
                last_error = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(options.poll_interval().min(deadline - now));
    }

    Err(ProbeError::Timeout {
        ms: options.timeout_ms,
        waited_for: waited_for.to_string(),
        last_error,
    })
}

// =============================================================================
// STANDARD CONDITIONS
// =============================================================================

/// Element conditions, weakest first. Clickable implies visible implies
/// present, but each is checked on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Attached to the hierarchy
    Present,
    /// Attached and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

impl Condition {
    /// Human-readable description
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }

    /// One evaluation against the device
    pub fn probe(
        self,
        session: &dyn DeviceSession,
        locator: &Locator,
    ) -> ProbeResult<Option<ElementHandle>> {
        let element = match session.find_element(locator) {
            Ok(element) => element,
            Err(e) if e.is_missing_element() => return Ok(None),
            Err(e) => return Err(e),
        };
        if self == Self::Present {
            return Ok(Some(element));
        }
        if !session.is_displayed(&element)? {
            return Ok(None);
        }
        if self == Self::Clickable && !session.is_enabled(&element)? {
            return Ok(None);
        }
        Ok(Some(element))
    }
}

/// One evaluation of "absent or invisible"
pub fn probe_absent(session: &dyn DeviceSession, locator: &Locator) -> ProbeResult<Option<()>> {
    let element = match session.find_element(locator) {
        Ok(element) => element,
        Err(e) if e.is_missing_element() => return Ok(Some(())),
        Err(e) => return Err(e),
    };
    match session.is_displayed(&element) {
        Ok(true) => Ok(None),
        Ok(false) => Ok(Some(())),
        Err(e) if e.is_missing_element() => Ok(Some(())),
        Err(e) => Err(e),
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls standard conditions against one session
#[derive(Clone, Copy)]
pub struct Waiter<'s> {
    session: &'s dyn DeviceSession,
}

impl std::fmt::Debug for Waiter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter").finish_non_exhaustive()
    }
}

impl<'s> Waiter<'s> {
    /// Create a waiter over a session
    #[must_use]
    pub fn new(session: &'s dyn DeviceSession) -> Self {
        Self { session }
    }

    /// Wait for an element condition
    pub fn for_element(
        &self,
        locator: &Locator,
        condition: Condition,
        options: &WaitOptions,
    ) -> ProbeResult<WaitResult<ElementHandle>> {
        locator.validate()?;
        let waited_for = format!("{locator} to be {}", condition.describe());
        poll(options, &waited_for, || condition.probe(self.session, locator))
    }

    /// Wait for an element to be absent or invisible
    pub fn for_absent(&self, locator: &Locator, options: &WaitOptions) -> ProbeResult<WaitResult<()>> {
        locator.validate()?;
        let waited_for = format!("{locator} to disappear");
        poll(options, &waited_for, || probe_absent(self.session, locator))
    }

    /// Wait for an element whose text contains `fragment`
    pub fn for_text(
        &self,
        locator: &Locator,
        fragment: &str,
        options: &WaitOptions,
    ) -> ProbeResult<WaitResult<ElementHandle>> {
        locator.validate()?;
        let waited_for = format!("{locator} to contain text {fragment:?}");
        poll(options, &waited_for, || {
            let Some(element) = Condition::Present.probe(self.session, locator)? else {
                return Ok(None);
            };
            let text = self.session.text(&element)?;
            Ok(text.contains(fragment).then_some(element))
        })
    }

    /// Wait for a custom device predicate
    pub fn until<F>(&self, waited_for: &str, options: &WaitOptions, predicate: F) -> ProbeResult<WaitResult<()>>
    where
        F: Fn(&dyn DeviceSession) -> ProbeResult<bool>,
    {
        poll(options, waited_for, || {
            Ok(predicate(self.session)?.then_some(()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeElement};
    use std::cell::Cell;

    fn fast(timeout_ms: u64) -> WaitOptions {
        WaitOptions::new().with_timeout(timeout_ms).with_poll_interval(5)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(options.poll_interval(), Duration::from_millis(500));
        }

        #[test]
        fn test_within() {
            let options = WaitOptions::within(Duration::from_secs(3));
            assert_eq!(options.timeout_ms, 3000);
            assert_eq!(options.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_satisfied_probe_returns_without_sleeping() {
            let options = WaitOptions::new().with_timeout(10_000).with_poll_interval(5_000);
            let result = poll(&options, "ready", || Ok(Some(7))).unwrap();
            assert_eq!(result.value, 7);
            assert_eq!(result.attempts, 1);
            assert!(result.elapsed < Duration::from_millis(500));
        }

        #[test]
        fn test_eventually_satisfied() {
            let calls = Cell::new(0);
            let result = poll(&fast(1_000), "third call", || {
                calls.set(calls.get() + 1);
                Ok((calls.get() >= 3).then_some("done"))
            })
            .unwrap();
            assert_eq!(result.value, "done");
            assert_eq!(result.attempts, 3);
        }

        #[test]
        fn test_timeout_reports_condition() {
            let err = poll::<(), _>(&fast(30), "never", || Ok(None)).unwrap_err();
            match err {
                ProbeError::Timeout { ms, waited_for, last_error } => {
                    assert_eq!(ms, 30);
                    assert_eq!(waited_for, "never");
                    assert!(last_error.is_none());
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_transient_errors_are_swallowed() {
            let calls = Cell::new(0);
            let result = poll(&fast(1_000), "flaky", || {
                calls.set(calls.get() + 1);
                if calls.get() < 2 {
                    Err(ProbeError::device("adb", "offline"))
                } else {
                    Ok(Some(()))
                }
            });
            assert!(result.is_ok());
        }

        #[test]
        fn test_last_transient_error_kept_on_timeout() {
            let err = poll::<(), _>(&fast(20), "flaky", || {
                Err(ProbeError::device("adb", "offline"))
            })
            .unwrap_err();
            assert!(err.to_string().contains("offline"));
        }

        #[test]
        fn test_non_transient_error_stops_immediately() {
            let calls = Cell::new(0);
            let err = poll::<(), _>(&fast(1_000), "bad", || {
                calls.set(calls.get() + 1);
                Err(ProbeError::invalid_locator("empty"))
            })
            .unwrap_err();
            assert!(matches!(err, ProbeError::InvalidLocator { .. }));
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_zero_timeout_still_evaluates_once() {
            let calls = Cell::new(0);
            let _ = poll::<(), _>(&fast(0), "once", || {
                calls.set(calls.get() + 1);
                Ok(None)
            });
            assert_eq!(calls.get(), 1);
        }
    }

    mod condition_tests {
        use super::*;

        const BUTTON: Locator = Locator::id("net.bucketplace:id/loginButton");

        #[test]
        fn test_present_but_hidden_is_not_visible() {
            let device = FakeDevice::new();
            device.add(FakeElement::new(BUTTON).hidden());
            let waiter = Waiter::new(&device);
            assert!(waiter.for_element(&BUTTON, Condition::Present, &fast(20)).is_ok());
            assert!(waiter.for_element(&BUTTON, Condition::Visible, &fast(20)).is_err());
        }

        #[test]
        fn test_disabled_is_visible_not_clickable() {
            let device = FakeDevice::new();
            device.add(FakeElement::new(BUTTON).disabled());
            let waiter = Waiter::new(&device);
            assert!(waiter.for_element(&BUTTON, Condition::Visible, &fast(20)).is_ok());
            assert!(waiter.for_element(&BUTTON, Condition::Clickable, &fast(20)).is_err());
        }

        #[test]
        fn test_absent_when_missing_or_hidden() {
            let device = FakeDevice::new();
            let waiter = Waiter::new(&device);
            assert!(waiter.for_absent(&BUTTON, &fast(20)).is_ok());
            device.add(FakeElement::new(BUTTON).hidden());
            assert!(waiter.for_absent(&BUTTON, &fast(20)).is_ok());
        }

        #[test]
        fn test_absent_times_out_while_displayed() {
            let device = FakeDevice::new();
            device.add(FakeElement::new(BUTTON));
            let err = Waiter::new(&device).for_absent(&BUTTON, &fast(20)).unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }

        #[test]
        fn test_element_appearing_later_is_found() {
            let device = FakeDevice::new();
            device.add(FakeElement::new(BUTTON).appear_after(Duration::from_millis(30)));
            let result = Waiter::new(&device)
                .for_element(&BUTTON, Condition::Visible, &fast(1_000))
                .unwrap();
            assert!(result.attempts > 1);
        }

        #[test]
        fn test_text_condition() {
            let device = FakeDevice::new();
            device.add(FakeElement::new(BUTTON).with_text("로그인하기"));
            let waiter = Waiter::new(&device);
            assert!(waiter.for_text(&BUTTON, "로그인", &fast(20)).is_ok());
            assert!(waiter.for_text(&BUTTON, "로그아웃", &fast(20)).is_err());
        }

        #[test]
        fn test_invalid_locator_is_not_polled() {
            let device = FakeDevice::new();
            let err = Waiter::new(&device)
                .for_element(&Locator::xpath(""), Condition::Present, &fast(1_000))
                .unwrap_err();
            assert!(matches!(err, ProbeError::InvalidLocator { .. }));
            assert_eq!(device.find_count(), 0);
        }

        #[test]
        fn test_custom_predicate() {
            let device = FakeDevice::new();
            device.set_current_package("net.bucketplace");
            let result = Waiter::new(&device).until("app in foreground", &fast(20), |s| {
                Ok(s.current_package()? == "net.bucketplace")
            });
            assert!(result.is_ok());
        }
    }
}
