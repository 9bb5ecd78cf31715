//! Play Store search results and the app detail page.

use crate::locator::Locator;
use crate::page_object::BasePage;
use crate::result::{ProbeError, ProbeResult};
use crate::session::DeviceSession;
use std::ops::Deref;
use std::time::Duration;

/// Result entry for the app
pub const APP_ENTRY: &[Locator] = &[
    Locator::ui_automator("new UiSelector().description(\"오늘의집 - 라이프스타일 슈퍼앱 BUCKETPLACE \")"),
    Locator::xpath("//android.widget.TextView[contains(@text,'오늘의집')]"),
];

/// Install button on the detail page
pub const INSTALL_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().className(\"android.widget.Button\").instance(1)"),
    Locator::xpath(
        "//androidx.compose.ui.platform.ComposeView[@resource-id='com.android.vending:id/0_resource_name_obfuscated']\
/android.view.View/android.view.View[1]/android.view.View/android.view.View/android.view.View\
/android.view.View[1]/android.view.View[2]/android.widget.Button",
    ),
];

/// "열기" button shown once installation completes
pub const OPEN_BUTTON: Locator = Locator::ui_automator("new UiSelector().textContains(\"열기\")");

/// Default retries for selecting and installing
pub const DEFAULT_RETRIES: u32 = 3;

/// Default wait for the install to finish
pub const INSTALL_COMPLETE_TIMEOUT: Duration = Duration::from_secs(40);

const ROUND: Duration = Duration::from_secs(1);
const CLICKABLE_WAIT: Duration = Duration::from_secs(5);
const AFTER_SELECT: Duration = Duration::from_secs(3);

fn any_displayed(session: &dyn DeviceSession, chain: &[Locator]) -> bool {
    chain.iter().any(|locator| {
        session
            .find_element(locator)
            .and_then(|element| session.is_displayed(&element))
            .unwrap_or(false)
    })
}

/// Search results and app detail
#[derive(Debug, Clone, Copy)]
pub struct SearchResultsPage<'s> {
    base: BasePage<'s>,
}

impl<'s> SearchResultsPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Whether an app entry is displayed within `timeout`
    pub fn wait_for_search_results(&self, timeout: Duration) -> bool {
        self.wait_until("search results", timeout, ROUND, |session| {
            Ok(any_displayed(session, APP_ENTRY))
        })
    }

    /// Whether the install button is displayed within `timeout`
    pub fn wait_for_app_detail_page(&self, timeout: Duration) -> bool {
        self.wait_until("app detail page", timeout, ROUND, |session| {
            Ok(any_displayed(session, INSTALL_BUTTON))
        })
    }

    /// Whether any install button is displayed right now
    #[must_use]
    pub fn is_install_button_displayed(&self) -> bool {
        any_displayed(self.session(), INSTALL_BUTTON)
    }

    /// Whether "열기" is displayed within `timeout`
    pub fn wait_for_install_complete(&self, timeout: Duration) -> bool {
        self.wait_until("install to complete", timeout, ROUND, |session| {
            Ok(any_displayed(session, std::slice::from_ref(&OPEN_BUTTON)))
        })
    }

    fn click_first(&self, chain: &[Locator]) -> bool {
        chain.iter().any(|locator| match self.click(locator, CLICKABLE_WAIT) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(%locator, error = %e, "not clickable");
                false
            }
        })
    }

    /// Open the app's detail page from the results, scrolling between attempts
    pub fn select_app(&self, max_retries: u32) -> ProbeResult<()> {
        if !self.wait_for_search_results(Duration::from_secs(10)) {
            return Err(ProbeError::assertion("search results did not load"));
        }
        self.dismiss_system_popup();
        self.sleep(ROUND);

        let attempts = max_retries.max(1);
        for attempt in 1..=attempts {
            if self.click_first(APP_ENTRY) {
                self.sleep(AFTER_SELECT);
                self.dismiss_system_popup();
                let loaded = self.wait_for_app_detail_page(Duration::from_secs(10));
                tracing::info!(attempt, detail_page = loaded, "app entry selected");
                return Ok(());
            }
            if attempt < attempts {
                if let Err(e) = self.scroll_to_text("오늘의집") {
                    tracing::debug!(error = %e, "scroll to app entry failed");
                }
                self.sleep(ROUND);
            }
        }
        Err(ProbeError::NotFound {
            attempted: APP_ENTRY.to_vec(),
        })
    }

    /// Tap install on the detail page
    pub fn install_app(&self, max_retries: u32) -> ProbeResult<()> {
        self.dismiss_system_popup();
        self.sleep(ROUND);
        if !self.wait_for_app_detail_page(Duration::from_secs(5)) {
            return Err(ProbeError::assertion("app detail page did not load"));
        }

        let attempts = max_retries.max(1);
        for attempt in 1..=attempts {
            if self.click_first(INSTALL_BUTTON) {
                self.sleep(ROUND);
                tracing::info!(attempt, "install tapped");
                return Ok(());
            }
            if attempt < attempts {
                self.dismiss_system_popup();
                self.sleep(ROUND);
            }
        }
        Err(ProbeError::NotFound {
            attempted: INSTALL_BUTTON.to_vec(),
        })
    }
}

impl<'s> Deref for SearchResultsPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
