//! Splash screen shown while the app boots.

use crate::locator::Locator;
use crate::page_object::BasePage;
use std::ops::Deref;
use std::time::Duration;

/// Full-screen splash container
pub const SPLASH_WHOLE: Locator =
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/splash_whole\")");
/// Splash animation
pub const SPLASH_LOTTIE: Locator =
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/splash_lottie\")");

/// Default splash wait
pub const SPLASH_TIMEOUT: Duration = Duration::from_secs(5);

/// Splash screen
#[derive(Debug, Clone, Copy)]
pub struct SplashPage<'s> {
    base: BasePage<'s>,
}

impl<'s> SplashPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Whether the splash animation shows within `timeout`
    pub fn wait_for_lottie(&self, timeout: Duration) -> bool {
        self.is_element_visible(&SPLASH_LOTTIE, timeout)
    }

    /// Whether the splash container shows within `timeout`
    pub fn wait_for_whole(&self, timeout: Duration) -> bool {
        self.is_element_visible(&SPLASH_WHOLE, timeout)
    }
}

impl<'s> Deref for SplashPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
