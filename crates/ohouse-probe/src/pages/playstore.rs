//! Google Play Store home and search.

use crate::config::PLAY_STORE_PACKAGE;
use crate::locator::Locator;
use crate::page_object::BasePage;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{keycode, ElementHandle};
use std::ops::Deref;
use std::time::Duration;

/// Search icon on the store home
pub const SEARCH_BUTTON: Locator =
    Locator::ui_automator("new UiSelector().className(\"android.widget.ImageView\").instance(3)");

/// "앱 및 게임 검색" box
pub const SEARCH_TEXTVIEW: &[Locator] = &[
    Locator::ui_automator("new UiSelector().text(\"앱 및 게임 검색\")"),
    Locator::xpath("//android.widget.TextView[@text='앱 및 게임 검색']"),
];

/// Search query input
pub const SEARCH_INPUT: &[Locator] = &[
    Locator::ui_automator("new UiSelector().className(\"android.widget.EditText\")"),
    Locator::xpath("//android.widget.EditText"),
];

/// Submit buttons, used when ENTER cannot be sent
pub const SEARCH_SUBMIT: &[Locator] = &[
    Locator::ui_automator("new UiSelector().description(\"검색\")"),
    Locator::xpath("//android.widget.Button[contains(@content-desc,'검색')]"),
    Locator::xpath("//android.widget.ImageButton[contains(@content-desc,'검색')]"),
];

/// Any result mentioning the app
pub const RESULTS_INDICATOR: Locator = Locator::xpath("//android.widget.TextView[contains(@text,'오늘의집')]");

/// Default search retries
pub const DEFAULT_SEARCH_RETRIES: u32 = 3;

const SEARCH_BUTTON_WAIT: Duration = Duration::from_secs(10);
const STEP_WAIT: Duration = Duration::from_secs(5);
const SUBMIT_WAIT: Duration = Duration::from_secs(2);
const RESULTS_WAIT: Duration = Duration::from_secs(10);

/// Play Store
#[derive(Debug, Clone, Copy)]
pub struct PlayStorePage<'s> {
    base: BasePage<'s>,
}

impl<'s> PlayStorePage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Search for `app_name`, restarting the store between failed attempts
    pub fn search_app(&self, app_name: &str, max_retries: u32) -> ProbeResult<()> {
        let attempts = max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.try_search(app_name) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    tracing::warn!(attempt, of = attempts, error = %e, "store search failed; restarting store");
                    self.restart_store();
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ProbeError::RetriesExhausted {
                        operation: format!("search for {app_name:?}"),
                        attempts,
                        last: Box::new(e),
                    })
                }
            }
        }
    }

    fn try_search(&self, app_name: &str) -> ProbeResult<()> {
        self.dismiss_system_popup();

        self.click(&SEARCH_BUTTON, SEARCH_BUTTON_WAIT)?;
        self.dismiss_system_popup();

        self.click(SEARCH_TEXTVIEW, STEP_WAIT)?;
        self.dismiss_system_popup();

        let input = self.search_input()?;
        self.session().clear(&input)?;
        self.session().send_keys(&input, app_name)?;
        self.submit_search(&input);

        if let Err(e) = self.wait_for_present(&RESULTS_INDICATOR, RESULTS_WAIT) {
            tracing::debug!(error = %e, "no result mentions the app yet");
        }
        self.dismiss_system_popup();
        Ok(())
    }

    fn search_input(&self) -> ProbeResult<ElementHandle> {
        match self.wait_for_visible(SEARCH_INPUT, STEP_WAIT) {
            Ok(input) => Ok(input),
            Err(e) => self
                .session()
                .find_elements(&SEARCH_INPUT[0])?
                .into_iter()
                .next()
                .ok_or(e),
        }
    }

    fn submit_search(&self, input: &ElementHandle) {
        let Err(e) = self.session().press_keycode(keycode::ENTER) else {
            return;
        };
        tracing::debug!(error = %e, "ENTER failed; trying the submit button");
        let submitted = SEARCH_SUBMIT.iter().any(|locator| {
            self.wait_for_clickable(locator, SUBMIT_WAIT)
                .and_then(|button| self.session().click(&button))
                .is_ok()
        });
        if !submitted {
            if let Err(e) = self.session().send_keys(input, "\n") {
                tracing::debug!(error = %e, "newline submit failed");
            }
        }
    }

    fn restart_store(&self) {
        self.dismiss_system_popup();
        if let Err(e) = self.session().activate_app(PLAY_STORE_PACKAGE) {
            tracing::warn!(error = %e, "could not activate the store");
            return;
        }
        if let Err(e) = self.wait_for_clickable(&SEARCH_BUTTON, SEARCH_BUTTON_WAIT) {
            tracing::debug!(error = %e, "store search button not back yet");
        }
    }
}

impl<'s> Deref for PlayStorePage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeElement};
    use crate::pages::test_rig::Rig;

    fn show_store(device: &FakeDevice) {
        device.add(FakeElement::new(SEARCH_BUTTON));
        device.add(FakeElement::new(SEARCH_TEXTVIEW[1].clone()));
        device.add(FakeElement::new(SEARCH_INPUT[0].clone()).with_text("이전 검색어"));
        device.add(FakeElement::new(RESULTS_INDICATOR));
    }

    #[test]
    fn test_search_types_query_and_presses_enter() {
        let rig = Rig::new();
        show_store(&rig.device);
        PlayStorePage::new(rig.base()).search_app("오늘의집", 3).unwrap();
        assert_eq!(rig.device.text_of(&SEARCH_INPUT[0]).unwrap(), "오늘의집");
        assert_eq!(rig.device.keycodes(), vec![keycode::ENTER]);
    }

    #[test]
    fn test_search_restarts_store_between_attempts() {
        let rig = Rig::new();
        let err = PlayStorePage::new(rig.base()).search_app("오늘의집", 2).unwrap_err();
        assert!(matches!(err, ProbeError::RetriesExhausted { attempts: 2, .. }));
        let activations = rig
            .device
            .calls()
            .iter()
            .filter(|c| *c == "activate:com.android.vending")
            .count();
        assert_eq!(activations, 1);
    }

    #[test]
    fn test_popup_dismissed_before_search() {
        let rig = Rig::new();
        show_store(&rig.device);
        let wait = crate::page_object::SYSTEM_POPUP_BUTTONS[0].clone();
        rig.device
            .add(FakeElement::new(wait.clone()).on_click(move |d| d.remove(&wait)));
        PlayStorePage::new(rig.base()).search_app("오늘의집", 1).unwrap();
        assert_eq!(
            rig.device
                .clicks(&crate::page_object::SYSTEM_POPUP_BUTTONS[0]),
            1
        );
    }
}
