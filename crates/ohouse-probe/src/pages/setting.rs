//! Settings screen reached from the gear on my page.

use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject, DEFAULT_ACTION_TIMEOUT};
use crate::result::ProbeResult;
use std::ops::Deref;

/// Logout entry at the bottom of the list
pub const LOGOUT_BUTTON: Locator = Locator::ui_automator("new UiSelector().text(\"로그아웃\")");

const KEY_LOCATORS: &[Locator] = &[
    Locator::ui_automator("new UiSelector().text(\"설정\").instance(1)"),
    Locator::ui_automator("new UiSelector().text(\"내 정보 관리\")"),
    Locator::ui_automator("new UiSelector().text(\"설정\").instance(0)"),
    Locator::ui_automator("new UiSelector().text(\"서비스 정보\")"),
];

/// Settings screen
#[derive(Debug, Clone, Copy)]
pub struct SettingPage<'s> {
    base: BasePage<'s>,
}

impl<'s> SettingPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Tap "로그아웃"
    pub fn click_logout(&self) -> ProbeResult<()> {
        self.click(LOGOUT_BUTTON, DEFAULT_ACTION_TIMEOUT)
    }
}

impl<'s> Deref for SettingPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageObject for SettingPage<'_> {
    fn page_name(&self) -> &'static str {
        "settings"
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn key_locators(&self) -> &'static [Locator] {
        KEY_LOCATORS
    }
}
