//! My page tab.

use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use std::ops::Deref;

/// "프로필" tab
pub const PROFILE_TAB: Locator = Locator::ui_automator("new UiSelector().text(\"프로필\")");
/// "쇼핑" tab inside my page
pub const SHOPPING_TAB: Locator = Locator::xpath("(//android.widget.TextView[@text=\"쇼핑\"])[1]");
/// Settings gear
pub const GEAR_ICON: Locator = Locator::ui_automator("new UiSelector().description(\"Gear icon\")");

const KEY_LOCATORS: &[Locator] = &[
    PROFILE_TAB,
    SHOPPING_TAB,
    GEAR_ICON,
    Locator::ui_automator("new UiSelector().text(\"쇼핑\")"),
];

/// My page tab
#[derive(Debug, Clone, Copy)]
pub struct MyPage<'s> {
    base: BasePage<'s>,
}

impl<'s> MyPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }
}

impl<'s> Deref for MyPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageObject for MyPage<'_> {
    fn page_name(&self) -> &'static str {
        "my page"
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn key_locators(&self) -> &'static [Locator] {
        KEY_LOCATORS
    }
}
