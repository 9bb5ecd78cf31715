//! Launcher app drawer, used to start the app the way a user would.

use crate::device::best_effort;
use crate::locator::Locator;
use crate::page_object::BasePage;
use crate::result::ProbeResult;
use crate::session::{DeviceSession, Point};
use std::ops::Deref;
use std::time::Duration;

/// Launcher "앱" button
pub const APP_DRAWER_BUTTON: Locator = Locator::ui_automator("new UiSelector().description(\"앱\")");
/// App icon in the drawer
pub const APP_ICON: Locator = Locator::ui_automator("new UiSelector().description(\"오늘의집\")");

const CLICKABLE_WAIT: Duration = Duration::from_secs(5);
const RUNNING_POLL: Duration = Duration::from_secs(1);
const RUNNING_SETTLE: Duration = Duration::from_secs(2);
const DRAWER_SWIPE: (Point, Point, Duration) = (
    Point::new(500, 1500),
    Point::new(500, 500),
    Duration::from_millis(300),
);

/// Launcher drawer
#[derive(Debug, Clone, Copy)]
pub struct AppDrawerPage<'s> {
    base: BasePage<'s>,
}

impl<'s> AppDrawerPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Whether the app under test is installed, polling until `timeout`
    pub fn wait_for_app_installed(&self, timeout: Duration) -> bool {
        let device = self.device();
        let package = self.app_package();
        self.wait_until("app installed", timeout, RUNNING_POLL, |_| {
            device.is_app_installed(package)
        })
    }

    /// Go home and open the drawer, swiping up when there is no drawer button
    pub fn open_app_drawer(&self) -> ProbeResult<()> {
        self.device().press_home()?;
        match self.click(&APP_DRAWER_BUTTON, CLICKABLE_WAIT) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "no drawer button; swiping up");
                let (from, to, duration) = DRAWER_SWIPE;
                self.session().swipe(from, to, duration)
            }
        }
    }

    /// Open the drawer and tap the app icon
    pub fn launch_app(&self) -> ProbeResult<()> {
        self.open_app_drawer()?;
        self.click(&APP_ICON, CLICKABLE_WAIT)?;
        tracing::info!(package = self.app_package(), "app icon tapped");
        Ok(())
    }

    /// Restart the app from the drawer and wait for it to come up.
    ///
    /// A running instance is terminated first.
    pub fn pre_processing_launch(&self) -> ProbeResult<bool> {
        let package = self.app_package();
        let running = best_effort(self.session().current_package(), "read foreground package") == package;
        if running {
            best_effort(self.device().terminate_all_apps(package), "terminate running app");
        }
        self.launch_app()?;
        Ok(self.wait_for_app_running(Duration::from_secs(10)))
    }

    /// Whether the app reaches the foreground within `timeout`
    pub fn wait_for_app_running(&self, timeout: Duration) -> bool {
        let package = self.app_package();
        let running = self.wait_until("app in foreground", timeout, RUNNING_POLL, |session: &dyn DeviceSession| {
            Ok(session.current_package()? == package)
        });
        if running {
            self.sleep(RUNNING_SETTLE);
        }
        running
    }
}

impl<'s> Deref for AppDrawerPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
