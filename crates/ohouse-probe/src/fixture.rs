//! Session fixture.
//!
//! One device session per scenario. Setup opens it, teardown quits it, and
//! teardown runs whether the scenario passed, failed or panicked.

use crate::appium::AppiumSession;
use crate::config::AppConfig;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{device_serial, DeviceSession};
use crate::shell::{AdbShell, DeviceShell};

pub use crate::config::AppLaunch;

/// Trait for resources acquired before a scenario and released after it
pub trait Fixture {
    /// Acquire the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be acquired.
    fn setup(&mut self) -> ProbeResult<()>;

    /// Release the resource. Must be safe to call when setup failed.
    ///
    /// # Errors
    ///
    /// Returns an error if release fails; the resource is considered gone anyway.
    fn teardown(&mut self) -> ProbeResult<()>;

    /// Fixture name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Lifecycle state of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Not set up yet
    Idle,
    /// Set up successfully
    SetUp,
    /// Torn down
    TornDown,
    /// Setup failed
    Failed,
}

/// Run `body` between `setup` and an unconditional `teardown`.
///
/// A teardown error is logged; the body's result is returned.
pub fn with_fixture<F, T>(fixture: &mut F, body: impl FnOnce(&mut F) -> ProbeResult<T>) -> ProbeResult<T>
where
    F: Fixture,
{
    if let Err(e) = fixture.setup() {
        let _ = fixture.teardown();
        return Err(e);
    }
    let result = body(fixture);
    if let Err(e) = fixture.teardown() {
        tracing::warn!(fixture = fixture.name(), error = %e, "teardown failed");
    }
    result
}

/// A device session together with a shell on the same device
pub struct OpenedSession {
    /// Automation session
    pub session: Box<dyn DeviceSession>,
    /// Shell on the session's device
    pub shell: Box<dyn DeviceShell>,
}

impl std::fmt::Debug for OpenedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedSession").finish_non_exhaustive()
    }
}

/// Creates device sessions
pub trait SessionFactory {
    /// Open a new session
    fn open(&self, launch: AppLaunch) -> ProbeResult<OpenedSession>;
}

/// Opens real Appium sessions with an adb shell on the same device
#[derive(Debug, Clone)]
pub struct AppiumFactory {
    config: AppConfig,
}

impl AppiumFactory {
    /// Factory for `config`
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for AppiumFactory {
    fn open(&self, launch: AppLaunch) -> ProbeResult<OpenedSession> {
        let session = AppiumSession::open(&self.config, launch)?;
        let serial = device_serial(&session.capabilities());
        Ok(OpenedSession {
            session: Box::new(session),
            shell: Box::new(AdbShell::new(&self.config.adb_path, serial)),
        })
    }
}

/// Per-scenario session; quits on teardown or drop
pub struct SessionFixture<'f> {
    factory: &'f dyn SessionFactory,
    launch: AppLaunch,
    opened: Option<OpenedSession>,
    state: FixtureState,
}

impl std::fmt::Debug for SessionFixture<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFixture")
            .field("launch", &self.launch)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'f> SessionFixture<'f> {
    /// Fixture that opens sessions through `factory`
    #[must_use]
    pub fn new(factory: &'f dyn SessionFactory, launch: AppLaunch) -> Self {
        Self {
            factory,
            launch,
            opened: None,
            state: FixtureState::Idle,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FixtureState {
        self.state
    }

    /// The open session
    pub fn session(&self) -> ProbeResult<&dyn DeviceSession> {
        self.opened
            .as_ref()
            .map(|o| o.session.as_ref())
            .ok_or_else(not_set_up)
    }

    /// Shell on the session's device
    pub fn shell(&self) -> ProbeResult<&dyn DeviceShell> {
        self.opened
            .as_ref()
            .map(|o| o.shell.as_ref())
            .ok_or_else(not_set_up)
    }
}

fn not_set_up() -> ProbeError {
    ProbeError::Fixture {
        message: "session is not open".to_string(),
    }
}

impl Fixture for SessionFixture<'_> {
    fn setup(&mut self) -> ProbeResult<()> {
        match self.factory.open(self.launch) {
            Ok(opened) => {
                self.opened = Some(opened);
                self.state = FixtureState::SetUp;
                Ok(())
            }
            Err(e) => {
                self.state = FixtureState::Failed;
                Err(e)
            }
        }
    }

    fn teardown(&mut self) -> ProbeResult<()> {
        let Some(opened) = self.opened.take() else {
            return Ok(());
        };
        self.state = FixtureState::TornDown;
        opened.session.quit()
    }

    fn name(&self) -> &str {
        "device-session"
    }
}

impl Drop for SessionFixture<'_> {
    fn drop(&mut self) {
        if self.opened.is_some() {
            if let Err(e) = self.teardown() {
                tracing::warn!(error = %e, "session quit failed during drop");
            }
        }
    }
}
