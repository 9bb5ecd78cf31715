//! Scenario runner.
//!
//! Opens a fresh session per scenario through a [`SessionFactory`], runs the
//! body, and always quits the session afterwards.

use super::report::{ScenarioOutcome, SuiteReport};
use super::{Priority, Scenario, ScenarioContext};
use crate::assertion::{AssertionMode, SoftChecks};
use crate::config::AppConfig;
use crate::fixture::{with_fixture, SessionFactory, SessionFixture};
use crate::page_object::Pace;
use crate::result::ProbeResult;
use crate::session::DeviceSession;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What to run and how
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only ids containing this (case-insensitive)
    pub filter: Option<String>,
    /// Only this priority
    pub priority: Option<Priority>,
    /// Stop after the first failed scenario
    pub fail_fast: bool,
    /// Save a screenshot here when a scenario fails
    pub screenshot_dir: Option<PathBuf>,
    /// Soft check mode inside each scenario
    pub mode: AssertionMode,
}

/// Progress callbacks
pub trait RunObserver {
    /// About to run `total` scenarios
    fn suite_started(&mut self, _total: usize) {}

    /// About to run `scenario`
    fn scenario_started(&mut self, _scenario: &Scenario) {}

    /// `scenario` finished (or was skipped)
    fn scenario_finished(&mut self, _outcome: &ScenarioOutcome) {}

    /// Every scenario is done
    fn suite_finished(&mut self, _report: &SuiteReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Runs scenarios one after another on sessions from a factory
pub struct ScenarioRunner<'f> {
    factory: &'f dyn SessionFactory,
    config: &'f AppConfig,
    pace: Pace,
    options: RunOptions,
}

impl std::fmt::Debug for ScenarioRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("pace", &self.pace)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Execution {
    error: Option<String>,
    checks: SoftChecks,
    screenshot: Option<PathBuf>,
}

impl<'f> ScenarioRunner<'f> {
    /// Runner with default options at real pace
    #[must_use]
    pub fn new(factory: &'f dyn SessionFactory, config: &'f AppConfig) -> Self {
        Self {
            factory,
            config,
            pace: Pace::real(),
            options: RunOptions::default(),
        }
    }

    /// Override the pace
    #[must_use]
    pub const fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    /// Set run options
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Scenarios matching the filter and priority, in order
    #[must_use]
    pub fn select(&self, scenarios: &[Scenario]) -> Vec<Scenario> {
        scenarios
            .iter()
            .filter(|s| s.matches(self.options.filter.as_deref(), self.options.priority))
            .copied()
            .collect()
    }

    /// Run the selected scenarios
    pub fn run(&self, scenarios: &[Scenario], observer: &mut dyn RunObserver) -> SuiteReport {
        let selected = self.select(scenarios);
        let mut report = SuiteReport::start();
        tracing::info!(run_id = %report.run_id, total = selected.len(), "suite started");
        observer.suite_started(selected.len());

        let mut stopped = false;
        for scenario in &selected {
            let outcome = if stopped {
                ScenarioOutcome::skipped(scenario)
            } else {
                observer.scenario_started(scenario);
                let outcome = self.run_one(scenario);
                stopped = self.options.fail_fast && outcome.status.is_failed();
                outcome
            };
            observer.scenario_finished(&outcome);
            report.add(outcome);
        }

        report.finish();
        tracing::info!(
            run_id = %report.run_id,
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "suite finished"
        );
        observer.suite_finished(&report);
        report
    }

    /// Run one scenario on its own session
    pub fn run_one(&self, scenario: &Scenario) -> ScenarioOutcome {
        let started = Instant::now();
        tracing::info!(id = scenario.id, title = scenario.title, "scenario started");

        let mut fixture = SessionFixture::new(self.factory, scenario.launch);
        let executed = with_fixture(&mut fixture, |fixture| self.execute(scenario, fixture));

        let outcome = match executed {
            Ok(execution) => {
                let checks = execution.checks;
                ScenarioOutcome::finished(
                    scenario,
                    execution.error,
                    checks.failures().to_vec(),
                    checks.warnings().to_vec(),
                    checks.check_count(),
                    started.elapsed(),
                )
                .with_screenshot(execution.screenshot)
            }
            Err(e) => ScenarioOutcome::setup_failed(scenario, e.to_string(), started.elapsed()),
        };

        if outcome.status.is_failed() {
            tracing::warn!(id = scenario.id, status = ?outcome.status, reason = %outcome.summary(), "scenario failed");
        } else {
            tracing::info!(id = scenario.id, elapsed = ?outcome.duration(), "scenario passed");
        }
        outcome
    }

    fn execute(&self, scenario: &Scenario, fixture: &mut SessionFixture<'_>) -> ProbeResult<Execution> {
        let session = fixture.session()?;
        let shell = fixture.shell()?;
        let mut ctx = ScenarioContext::new(session, shell, self.config)
            .with_pace(self.pace)
            .with_mode(self.options.mode);

        let result = ctx
            .apply_prelude(scenario.prelude)
            .and_then(|()| (scenario.run)(&mut ctx));
        let error = result.err().map(|e| e.to_string());

        let failed = error.is_some() || !ctx.checks.all_passed();
        let screenshot = match &self.options.screenshot_dir {
            Some(dir) if failed => save_screenshot(session, dir, scenario.id),
            _ => None,
        };
        Ok(Execution {
            error,
            checks: ctx.checks,
            screenshot,
        })
    }
}

fn save_screenshot(session: &dyn DeviceSession, dir: &Path, id: &str) -> Option<PathBuf> {
    let path = dir.join(format!(
        "{id}-{}.png",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let saved = session
        .screenshot()
        .and_then(|png| {
            std::fs::create_dir_all(dir)?;
            std::fs::write(&path, png)?;
            Ok(())
        });
    match saved {
        Ok(()) => {
            tracing::info!(path = %path.display(), "failure screenshot saved");
            Some(path)
        }
        Err(e) => {
            tracing::warn!(id, error = %e, "could not save failure screenshot");
            None
        }
    }
}
