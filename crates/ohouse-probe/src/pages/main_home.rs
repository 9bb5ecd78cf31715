//! Main home screen with the bottom navigation bar.

use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::pages::my_page::{MyPage, GEAR_ICON};
use crate::pages::setting::SettingPage;
use crate::result::{ProbeError, ProbeResult};
use std::ops::Deref;
use std::time::Duration;

/// Top "홈" tab
pub const HOME_TOP_TAB: Locator = Locator::ui_automator("new UiSelector().text(\"홈\").instance(0)");
/// Bottom "홈" button
pub const HOME_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"홈\").instance(1)");
/// Bottom "커뮤니티" button
pub const COMMUNITY_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"커뮤니티\")");
/// Bottom "쇼핑" button
pub const SHOPPING_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"쇼핑\")");
/// Bottom "인테리어/생활" button
pub const INTERIOR_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"인테리어/생활\")");
/// Bottom "마이페이지" button
pub const MY_PAGE_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"마이페이지\")");

const KEY_LOCATORS: &[Locator] = &[
    HOME_TOP_TAB,
    HOME_BUTTON,
    COMMUNITY_BUTTON,
    SHOPPING_BUTTON,
    INTERIOR_BUTTON,
    MY_PAGE_BUTTON,
];

/// Body of the Google Password Manager save prompt
pub const PASSWORD_MANAGER_PROMPT: &[Locator] = &[
    Locator::ui_automator("new UiSelector().text(\"비밀번호을(를) Google 비밀번호 관리자에 저장하시겠습니까?\")"),
    Locator::ui_automator("new UiSelector().textContains(\"비밀번호을(를) Google 비밀번호 관리자에 저장하시겠습니까?\")"),
    Locator::xpath("//android.widget.TextView[@text=\"비밀번호을(를) Google 비밀번호 관리자에 저장하시겠습니까?\"]"),
    Locator::xpath("//android.widget.TextView[contains(@text, \"비밀번호을(를) Google 비밀번호 관리자에 저장하시겠습니까?\")]"),
];

/// "나중에" then "사용 안함" buttons of the save prompt
pub const PASSWORD_MANAGER_DISMISS: &[Locator] = &[
    Locator::ui_automator("new UiSelector().text(\"나중에\")"),
    Locator::ui_automator("new UiSelector().textContains(\"나중에\")"),
    Locator::xpath("//android.widget.Button[@text=\"나중에\"]"),
    Locator::xpath("//android.widget.TextView[@text=\"나중에\"]"),
    Locator::xpath("//*[@text=\"나중에\"]"),
    Locator::ui_automator("new UiSelector().text(\"사용 안함\")"),
    Locator::ui_automator("new UiSelector().textContains(\"사용 안함\")"),
    Locator::xpath("//android.widget.Button[@text=\"사용 안함\"]"),
    Locator::xpath("//android.widget.TextView[@text=\"사용 안함\"]"),
    Locator::xpath("//*[@text=\"사용 안함\"]"),
];

const DISPLAYED_CHECK: Duration = Duration::from_secs(1);
const TRANSITION_PAUSE: Duration = Duration::from_millis(500);

/// Main home screen
#[derive(Debug, Clone, Copy)]
pub struct MainHomePage<'s> {
    base: BasePage<'s>,
}

impl<'s> MainHomePage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn first_displayed(&self, chain: &[Locator], timeout: Duration) -> Option<usize> {
        chain.iter().position(|locator| {
            self.is_element_present(locator, timeout) && self.is_element_visible(locator, DISPLAYED_CHECK)
        })
    }

    /// Whether the Google Password Manager prompt is showing
    pub fn is_password_manager_prompt_present(&self, timeout: Duration) -> bool {
        self.first_displayed(PASSWORD_MANAGER_PROMPT, timeout).is_some()
    }

    /// Tap "나중에" or "사용 안함" on the save prompt
    pub fn dismiss_password_manager_prompt(&self, timeout: Duration) -> bool {
        let Some(index) = self.first_displayed(PASSWORD_MANAGER_DISMISS, timeout) else {
            tracing::warn!("password manager prompt has no dismiss button");
            return false;
        };
        match self.click(&PASSWORD_MANAGER_DISMISS[index], DISPLAYED_CHECK) {
            Ok(()) => {
                self.sleep(TRANSITION_PAUSE);
                tracing::info!("password manager prompt dismissed");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "password manager dismiss tap failed");
                false
            }
        }
    }

    /// Log out through my page and settings.
    ///
    /// Each step waits up to `timeout`; the error names the step that failed.
    pub fn logout(&self, timeout: Duration) -> ProbeResult<()> {
        let step = |what: &str, e: ProbeError| ProbeError::assertion(format!("logout: {what}: {e}"));

        self.click(&MY_PAGE_BUTTON, timeout)
            .map_err(|e| step("my page button", e))?;
        self.sleep(TRANSITION_PAUSE);

        let my_page = MyPage::new(self.base);
        if !my_page.is_loaded(timeout) {
            return Err(ProbeError::assertion("logout: my page did not load"));
        }
        my_page
            .click(&GEAR_ICON, timeout)
            .map_err(|e| step("settings gear", e))?;
        self.sleep(TRANSITION_PAUSE);

        let settings = SettingPage::new(self.base);
        if !settings.is_loaded(timeout) {
            return Err(ProbeError::assertion("logout: settings did not load"));
        }
        settings
            .scroll_to_bottom()
            .map_err(|e| step("scroll to bottom", e))?;
        self.sleep(TRANSITION_PAUSE);

        settings.click_logout().map_err(|e| step("logout entry", e))?;
        tracing::info!("logged out");
        Ok(())
    }
}

impl<'s> Deref for MainHomePage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageObject for MainHomePage<'_> {
    fn page_name(&self) -> &'static str {
        "main home"
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn key_locators(&self) -> &'static [Locator] {
        KEY_LOCATORS
    }
}
