//! Per-scenario outcomes and the suite report.

use super::{Priority, Scenario};
use crate::assertion::CheckFailure;
use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// How a scenario ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Ran to the end with every check passing
    Passed,
    /// Ran to the end with soft check failures
    ChecksFailed,
    /// Stopped by a hard assertion or an error
    Failed,
    /// The session could not be opened
    SetupFailed,
    /// Not run because an earlier scenario failed in fail-fast mode
    Skipped,
}

impl OutcomeStatus {
    /// Whether the scenario passed
    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the scenario counts as a failure
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::ChecksFailed | Self::Failed | Self::SetupFailed)
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id
    pub id: String,
    /// Scenario title
    pub title: String,
    /// Priority tag
    pub priority: Priority,
    /// How it ended
    pub status: OutcomeStatus,
    /// Error that stopped it
    pub error: Option<String>,
    /// Soft check failures, in order
    pub failures: Vec<CheckFailure>,
    /// Notes that did not fail the scenario
    pub warnings: Vec<String>,
    /// Soft checks made
    pub checks: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Screenshot saved on failure
    pub screenshot: Option<PathBuf>,
}

impl ScenarioOutcome {
    fn base(scenario: &Scenario, status: OutcomeStatus, duration: Duration) -> Self {
        Self {
            id: scenario.id.to_string(),
            title: scenario.title.to_string(),
            priority: scenario.priority,
            status,
            error: None,
            failures: Vec::new(),
            warnings: Vec::new(),
            checks: 0,
            duration_ms: duration.as_millis() as u64,
            screenshot: None,
        }
    }

    /// Outcome for a scenario that ran, passing or not
    #[must_use]
    pub fn finished(
        scenario: &Scenario,
        error: Option<String>,
        failures: Vec<CheckFailure>,
        warnings: Vec<String>,
        checks: usize,
        duration: Duration,
    ) -> Self {
        let status = match (&error, failures.is_empty()) {
            (Some(_), _) => OutcomeStatus::Failed,
            (None, false) => OutcomeStatus::ChecksFailed,
            (None, true) => OutcomeStatus::Passed,
        };
        Self {
            error,
            failures,
            warnings,
            checks,
            ..Self::base(scenario, status, duration)
        }
    }

    /// Outcome for a scenario whose session never opened
    #[must_use]
    pub fn setup_failed(scenario: &Scenario, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(scenario, OutcomeStatus::SetupFailed, duration)
        }
    }

    /// Outcome for a scenario left out by fail-fast
    #[must_use]
    pub fn skipped(scenario: &Scenario) -> Self {
        Self::base(scenario, OutcomeStatus::Skipped, Duration::ZERO)
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: Option<PathBuf>) -> Self {
        self.screenshot = path;
        self
    }

    /// Wall-clock duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// One-line reason for a failure
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.error, self.failures.as_slice()) {
            (Some(error), _) => error.clone(),
            (None, [first, rest @ ..]) if rest.is_empty() => first.message.clone(),
            (None, [first, rest @ ..]) => format!("{} (+{} more)", first.message, rest.len()),
            (None, []) => String::new(),
        }
    }
}

/// Results of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Outcomes in run order
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Empty report starting now
    #[must_use]
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            outcomes: Vec::new(),
        }
    }

    /// Add an outcome
    pub fn add(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    /// Stamp the finish time
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_passed()).count()
    }

    /// Failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_failed()).count()
    }

    /// Skipped scenarios
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Skipped)
            .count()
    }

    /// Scenarios in the report
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Failed outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed()).collect()
    }

    /// Time between start and finish
    #[must_use]
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`, creating parent directories
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
