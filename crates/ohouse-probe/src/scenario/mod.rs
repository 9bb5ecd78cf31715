//! Scenario scripts and the runner that executes them.
//!
//! A [`Scenario`] is a named, prioritised function over a
//! [`ScenarioContext`]. The context carries the session, the shell, the
//! configuration and the soft checks of one run; scenarios build pages from
//! [`ScenarioContext::base`] as they go.

mod install;
mod login;
mod registry;
mod report;
mod runner;

pub use registry::{all_scenarios, find_scenario};
pub use report::{OutcomeStatus, ScenarioOutcome, SuiteReport};
pub use runner::{NoopObserver, RunObserver, RunOptions, ScenarioRunner};

use crate::assertion::{AssertionMode, SoftChecks};
use crate::config::{AppConfig, AppLaunch, Credentials, PLAY_STORE_PACKAGE};
use crate::page_object::{BasePage, Pace, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::session::DeviceSession;
use crate::shell::DeviceShell;
use crate::toast::ToastOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const PLAY_STORE_SETTLE: Duration = Duration::from_secs(3);

/// Scenario priority tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Core journeys
    P1,
    /// Important variations
    P2,
    /// Edge cases and UI details
    P3,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
        };
        f.pad(tag)
    }
}

impl FromStr for Priority {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p1" => Ok(Self::P1),
            "p2" => Ok(Self::P2),
            "p3" => Ok(Self::P3),
            other => Err(ProbeError::config(format!(
                "unknown priority {other:?}; expected p1, p2 or p3"
            ))),
        }
    }
}

/// Device preparation done after the session opens and before the scenario runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prelude {
    /// Start from whatever is on screen
    None,
    /// Bring the Play Store to the front and let it settle
    PlayStore,
}

/// Scenario body
pub type ScenarioFn = fn(&mut ScenarioContext<'_>) -> ProbeResult<()>;

/// One end-to-end journey
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Identifier such as `LOGIN_004`
    pub id: &'static str,
    /// What the scenario verifies
    pub title: &'static str,
    /// Priority tag
    pub priority: Priority,
    /// How the session is opened
    pub launch: AppLaunch,
    /// Device preparation
    pub prelude: Prelude,
    /// Scenario body
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("launch", &self.launch)
            .field("prelude", &self.prelude)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Whether the id contains `filter` (case-insensitive) and the priority matches
    #[must_use]
    pub fn matches(&self, filter: Option<&str>, priority: Option<Priority>) -> bool {
        let id_matches = filter.map_or(true, |f| {
            self.id.to_ascii_lowercase().contains(&f.to_ascii_lowercase())
        });
        id_matches && priority.map_or(true, |p| p == self.priority)
    }
}

/// Everything a scenario body can reach
pub struct ScenarioContext<'a> {
    session: &'a dyn DeviceSession,
    shell: &'a dyn DeviceShell,
    config: &'a AppConfig,
    pace: Pace,
    /// Soft checks collected during the run
    pub checks: SoftChecks,
}

impl fmt::Debug for ScenarioContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("pace", &self.pace)
            .field("checks", &self.checks)
            .finish_non_exhaustive()
    }
}

impl<'a> ScenarioContext<'a> {
    /// Context with collecting soft checks at real pace
    #[must_use]
    pub fn new(session: &'a dyn DeviceSession, shell: &'a dyn DeviceShell, config: &'a AppConfig) -> Self {
        Self {
            session,
            shell,
            config,
            pace: Pace::real(),
            checks: SoftChecks::new(),
        }
    }

    /// Override the pace
    #[must_use]
    pub const fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    /// Use soft checks in `mode`
    #[must_use]
    pub fn with_mode(mut self, mode: AssertionMode) -> Self {
        self.checks = SoftChecks::with_mode(mode);
        self
    }

    /// Page base for building page models
    #[must_use]
    pub fn base(&self) -> BasePage<'a> {
        BasePage::new(self.session, self.shell, self.config).with_pace(self.pace)
    }

    /// The automation session
    #[must_use]
    pub fn session(&self) -> &'a dyn DeviceSession {
        self.session
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &'a AppConfig {
        self.config
    }

    /// Sleep for a nominal duration at the context's pace
    pub fn sleep(&self, nominal: Duration) {
        self.pace.sleep(nominal);
    }

    /// Account credentials; missing ones stop the scenario
    pub fn credentials(&self) -> ProbeResult<Credentials> {
        self.config
            .credentials()
            .map_err(|e| ProbeError::assertion(e.to_string()))
    }

    /// Soft-check that a toast containing `fragment` shows up and goes away.
    ///
    /// A toast that was never seen but is not on screen at the deadline is
    /// recorded as a warning, not a failure.
    pub fn check_toast_cycle(&mut self, fragment: &str, appear: Duration, disappear: Duration) -> ProbeResult<()> {
        let base = self.base();
        match base.wait_for_toast(fragment, appear) {
            Ok(ToastOutcome::Observed) => {}
            Ok(ToastOutcome::InferredDismissed) => self.checks.warn(format!(
                "toast {fragment:?} was not observed; assumed shown and dismissed"
            )),
            Err(e) => self
                .checks
                .fail(format!("toast {fragment:?} did not appear: {e}"))?,
        }
        if let Err(e) = base.wait_for_toast_to_disappear(fragment, disappear) {
            self.checks
                .fail(format!("toast {fragment:?} did not disappear: {e}"))?;
        }
        Ok(())
    }

    /// Soft-check that `page` loads within `timeout`; returns whether it did
    pub fn check_loaded(&mut self, page: &dyn PageObject, timeout: Duration) -> ProbeResult<bool> {
        let loaded = page.is_loaded(timeout);
        self.checks.check(
            loaded,
            format!("{} page did not load within {}s", page.page_name(), timeout.as_secs()),
        )?;
        Ok(loaded)
    }

    /// Prepare the device for a scenario
    pub fn apply_prelude(&self, prelude: Prelude) -> ProbeResult<()> {
        match prelude {
            Prelude::None => Ok(()),
            Prelude::PlayStore => {
                self.session.activate_app(PLAY_STORE_PACKAGE)?;
                self.sleep(PLAY_STORE_SETTLE);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeShell};

    fn noop(_: &mut ScenarioContext<'_>) -> ProbeResult<()> {
        Ok(())
    }

    const SAMPLE: Scenario = Scenario {
        id: "LOGIN_004",
        title: "email login form opens",
        priority: Priority::P1,
        launch: AppLaunch::SkipLaunch,
        prelude: Prelude::None,
        run: noop,
    };

    mod priority_tests {
        use super::*;

        #[test]
        fn test_parse_and_display() {
            assert_eq!("P2".parse::<Priority>().unwrap(), Priority::P2);
            assert_eq!(Priority::P3.to_string(), "p3");
            assert!("p9".parse::<Priority>().is_err());
            assert_eq!(serde_json::to_string(&Priority::P1).unwrap(), "\"p1\"");
        }

        #[test]
        fn test_matches() {
            assert!(SAMPLE.matches(None, None));
            assert!(SAMPLE.matches(Some("login_00"), Some(Priority::P1)));
            assert!(!SAMPLE.matches(Some("INSTALL"), None));
            assert!(!SAMPLE.matches(None, Some(Priority::P3)));
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_missing_credentials_is_an_assertion() {
            let (device, shell, config) = (FakeDevice::new(), FakeShell::new(), AppConfig::default());
            let ctx = ScenarioContext::new(&device, &shell, &config);
            let err = ctx.credentials().unwrap_err();
            assert!(matches!(err, ProbeError::AssertionFailed { .. }));
            assert!(err.to_string().contains("LOGIN_ID"));
        }

        #[test]
        fn test_toast_cycle_observed() {
            let (device, shell, config) = (FakeDevice::new(), FakeShell::new(), AppConfig::default());
            device.show_toast("로그아웃 되었습니다.", Duration::from_millis(20));
            let mut ctx = ScenarioContext::new(&device, &shell, &config).with_pace(Pace::accelerated(100));
            ctx.check_toast_cycle("로그아웃", Duration::from_secs(5), Duration::from_secs(5))
                .unwrap();
            assert!(ctx.checks.all_passed());
            assert!(ctx.checks.warnings().is_empty());
        }

        #[test]
        fn test_toast_cycle_inferred_is_a_warning() {
            let (device, shell, config) = (FakeDevice::new(), FakeShell::new(), AppConfig::default());
            let mut ctx = ScenarioContext::new(&device, &shell, &config).with_pace(Pace::accelerated(100));
            ctx.check_toast_cycle("로그인 중입니다.", Duration::from_millis(500), Duration::from_secs(10))
                .unwrap();
            assert!(ctx.checks.all_passed());
            assert_eq!(ctx.checks.warnings().len(), 1);
        }

        #[test]
        fn test_toast_that_stays_fails() {
            let (device, shell, config) = (FakeDevice::new(), FakeShell::new(), AppConfig::default());
            device.show_toast("이메일을 입력해주세요.", Duration::from_secs(60));
            let mut ctx = ScenarioContext::new(&device, &shell, &config).with_pace(Pace::accelerated(100));
            ctx.check_toast_cycle("이메일", Duration::from_secs(5), Duration::from_secs(5))
                .unwrap();
            assert_eq!(ctx.checks.failures().len(), 1);
            assert!(ctx.checks.failures()[0].message.contains("did not disappear"));
        }

        #[test]
        fn test_play_store_prelude() {
            let (device, shell, config) = (FakeDevice::new(), FakeShell::new(), AppConfig::default());
            let ctx = ScenarioContext::new(&device, &shell, &config).with_pace(Pace::accelerated(100));
            ctx.apply_prelude(Prelude::None).unwrap();
            assert!(device.calls().is_empty());
            ctx.apply_prelude(Prelude::PlayStore).unwrap();
            assert_eq!(device.current_package().unwrap(), PLAY_STORE_PACKAGE);
        }
    }
}
