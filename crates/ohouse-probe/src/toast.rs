//! Toast detection.
//!
//! Android toasts render on a timer the suite does not control and can be gone
//! before the first poll lands. Appearance detection therefore accepts "no
//! matching toast on screen at the deadline" as a pass, but reports it as
//! [`ToastOutcome::InferredDismissed`] so a toast that never rendered stays
//! visible in run reports. Disappearance has no such ambiguity and times out hard.

use crate::locator::{Locator, Strategy};
use crate::result::{ProbeError, ProbeResult};
use crate::session::DeviceSession;
use crate::wait::{poll, probe_absent, Condition, WaitOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default appearance/disappearance budget (5 seconds)
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_secs(5);

/// Toast polling interval
pub const TOAST_POLL_INTERVAL_MS: u64 = 100;

const TOAST_PREFIX: &str = "//android.widget.Toast[contains(@text, ";
const TOAST_SUFFIX: &str = ")]";

/// How an expected toast was confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastOutcome {
    /// A matching toast was seen on screen
    Observed,
    /// Never seen; nothing matching was displayed at the deadline either
    InferredDismissed,
}

impl ToastOutcome {
    /// The toast was actually seen
    #[must_use]
    pub const fn was_observed(self) -> bool {
        matches!(self, Self::Observed)
    }
}

/// Locator for a toast whose text contains `fragment` (case-sensitive)
#[must_use]
pub fn toast_locator(fragment: &str) -> Locator {
    Locator::new(
        Strategy::XPath,
        format!("{TOAST_PREFIX}{}{TOAST_SUFFIX}", xpath_literal(fragment)),
    )
}

/// Recover the text fragment from a locator built by [`toast_locator`]
#[must_use]
pub fn toast_fragment(locator: &Locator) -> Option<String> {
    if locator.strategy() != Strategy::XPath {
        return None;
    }
    let inner = locator
        .expression()
        .strip_prefix(TOAST_PREFIX)?
        .strip_suffix(TOAST_SUFFIX)?;
    parse_xpath_literal(inner)
}

/// Render `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is split
/// into a `concat()` of literals.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let mut parts = Vec::new();
    for (i, chunk) in text.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// Inverse of [`xpath_literal`]
#[must_use]
pub fn parse_xpath_literal(expr: &str) -> Option<String> {
    if let Some(args) = expr.strip_prefix("concat(").and_then(|s| s.strip_suffix(')')) {
        let mut out = String::new();
        let mut rest = args.trim_start();
        while !rest.is_empty() {
            let (value, tail) = split_literal(rest)?;
            out.push_str(value);
            rest = tail.trim_start();
            if let Some(next) = rest.strip_prefix(',') {
                rest = next.trim_start();
            } else if !rest.is_empty() {
                return None;
            }
        }
        return Some(out);
    }
    match split_literal(expr)? {
        (value, "") => Some(value.to_string()),
        _ => None,
    }
}

fn split_literal(s: &str) -> Option<(&str, &str)> {
    let quote = s.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &s[1..];
    let end = body.find(quote)?;
    Some((&body[..end], &body[end + 1..]))
}

/// Appearance/disappearance polling for toasts
#[derive(Clone, Copy)]
pub struct ToastDetector<'s> {
    session: &'s dyn DeviceSession,
    poll_interval_ms: u64,
}

impl std::fmt::Debug for ToastDetector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastDetector")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish_non_exhaustive()
    }
}

impl<'s> ToastDetector<'s> {
    /// Detector over a session
    #[must_use]
    pub fn new(session: &'s dyn DeviceSession) -> Self {
        Self {
            session,
            poll_interval_ms: TOAST_POLL_INTERVAL_MS,
        }
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    fn options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::within(timeout).with_poll_interval(self.poll_interval_ms)
    }

    /// Wait for a toast containing `fragment` to show up.
    ///
    /// Fails only if the deadline passes while a matching toast is still
    /// displayed, or on a non-transient error.
    pub fn wait_for_message(&self, fragment: &str, timeout: Duration) -> ProbeResult<ToastOutcome> {
        let locator = toast_locator(fragment);
        let waited_for = format!("toast containing {fragment:?}");
        let err = match poll(&self.options(timeout), &waited_for, || {
            Condition::Present.probe(self.session, &locator)
        }) {
            Ok(result) => {
                tracing::debug!(fragment, elapsed = ?result.elapsed, "toast observed");
                return Ok(ToastOutcome::Observed);
            }
            Err(err @ ProbeError::Timeout { .. }) => err,
            Err(err) => return Err(err),
        };

        match self.any_displayed(&locator) {
            Ok(true) => Err(err),
            Ok(false) => {
                tracing::warn!(fragment, "toast not observed; assuming it was already dismissed");
                Ok(ToastOutcome::InferredDismissed)
            }
            Err(query_err) => {
                tracing::warn!(fragment, error = %query_err, "toast not observed and fallback query failed; assuming dismissed");
                Ok(ToastOutcome::InferredDismissed)
            }
        }
    }

    /// Wait for every toast containing `fragment` to be gone
    pub fn wait_for_disappear(&self, fragment: &str, timeout: Duration) -> ProbeResult<Duration> {
        let locator = toast_locator(fragment);
        let waited_for = format!("toast containing {fragment:?} to disappear");
        let result = poll(&self.options(timeout), &waited_for, || {
            probe_absent(self.session, &locator)
        })?;
        tracing::debug!(fragment, elapsed = ?result.elapsed, "toast gone");
        Ok(result.elapsed)
    }

    fn any_displayed(&self, locator: &Locator) -> ProbeResult<bool> {
        for element in self.session.find_elements(locator)? {
            if self.session.is_displayed(&element)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
