//! Soft checks.
//!
//! Collect several check failures in one scenario run instead of stopping at
//! the first. In [`AssertionMode::FailFast`] the first failure is returned as
//! an error so `?` ends the scenario.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of the failed check among all checks made
    pub index: usize,
}

/// What a failed check does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssertionMode {
    /// Record and continue
    #[default]
    Collect,
    /// Record and return an error
    FailFast,
}

/// Soft check collector for one scenario
#[derive(Debug, Clone, Default)]
pub struct SoftChecks {
    failures: Vec<CheckFailure>,
    warnings: Vec<String>,
    mode: AssertionMode,
    check_count: usize,
}

impl SoftChecks {
    /// Collecting checker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checker with a specific mode
    #[must_use]
    pub fn with_mode(mode: AssertionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> AssertionMode {
        self.mode
    }

    /// Check a condition
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> ProbeResult<()> {
        self.check_count += 1;
        if condition {
            return Ok(());
        }
        self.record(message.into())
    }

    /// Check two values are equal
    pub fn check_eq<T: PartialEq + Debug>(
        &mut self,
        actual: &T,
        expected: &T,
        message: &str,
    ) -> ProbeResult<()> {
        self.check_count += 1;
        if actual == expected {
            return Ok(());
        }
        self.record(format!("{message}: expected {expected:?}, got {actual:?}"))
    }

    /// Check a string contains a fragment
    pub fn check_contains(&mut self, haystack: &str, needle: &str, message: &str) -> ProbeResult<()> {
        self.check_count += 1;
        if haystack.contains(needle) {
            return Ok(());
        }
        self.record(format!("{message}: expected {haystack:?} to contain {needle:?}"))
    }

    /// Check a fallible step succeeded, keeping its value
    pub fn check_ok<T>(&mut self, result: ProbeResult<T>, message: &str) -> ProbeResult<Option<T>> {
        self.check_count += 1;
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.record(format!("{message}: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Record an unconditional failure
    pub fn fail(&mut self, message: impl Into<String>) -> ProbeResult<()> {
        self.check_count += 1;
        self.record(message.into())
    }

    /// Note something that passed on weaker evidence than it should have
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "check passed with a warning");
        self.warnings.push(message);
    }

    fn record(&mut self, message: String) -> ProbeResult<()> {
        tracing::warn!(%message, "check failed");
        self.failures.push(CheckFailure {
            message: message.clone(),
            index: self.check_count - 1,
        });
        match self.mode {
            AssertionMode::Collect => Ok(()),
            AssertionMode::FailFast => Err(ProbeError::assertion(message)),
        }
    }

    /// Failed checks so far
    #[must_use]
    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    /// Warnings so far
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of checks made
    #[must_use]
    pub const fn check_count(&self) -> usize {
        self.check_count
    }

    /// No check has failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Err` listing every failure if any check failed
    pub fn verify(&self) -> ProbeResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let mut message = format!("{} check(s) failed:", self.failures.len());
        for (i, failure) in self.failures.iter().enumerate() {
            message.push_str(&format!("\n  {}. {}", i + 1, failure.message));
        }
        Err(ProbeError::assertion(message))
    }
}

/// Hard assertion: `Err` when `condition` is false
pub fn ensure(condition: bool, message: impl Into<String>) -> ProbeResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::assertion(message))
    }
}
