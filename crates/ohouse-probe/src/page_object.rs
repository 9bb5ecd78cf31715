//! Page Object Model support.
//!
//! A page is a catalog of [`Locator`] constants plus composite actions built
//! on [`BasePage`]. Pages hold nothing but the base (session, shell, config,
//! pace) and are cheap to construct per use.

use crate::assertion::SoftChecks;
use crate::config::AppConfig;
use crate::device::{DeviceController, SettleDelays};
use crate::locator::{scroll_text_into_view, scroll_to_end, Locator, Target};
use crate::result::ProbeResult;
use crate::session::{keycode, DeviceSession, ElementHandle};
use crate::shell::DeviceShell;
use crate::toast::{ToastDetector, ToastOutcome, TOAST_POLL_INTERVAL_MS};
use crate::wait::{Condition, WaitOptions, Waiter, DEFAULT_POLL_INTERVAL_MS};
use crate::resolver::Resolver;
use std::time::{Duration, Instant};

/// Default timeout for page actions
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for presence checks
pub const PRESENCE_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Default page load timeout
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

const QUICK_CHECK: Duration = Duration::from_secs(1);
const ROUND_PRESENCE: Duration = Duration::from_millis(500);
const ROUND_VISIBLE: Duration = Duration::from_secs(2);
const ROUND_PAUSE: Duration = Duration::from_millis(500);
const POPUP_PAUSE: Duration = Duration::from_millis(500);
const DISABLED_CHECK_WAIT: Duration = Duration::from_secs(1);
const MAX_BACKSPACES: usize = 50;
const MASK_CHAR: char = '•';

/// Buttons of the system "app isn't responding" dialog
pub const SYSTEM_POPUP_BUTTONS: [Locator; 2] = [
    Locator::ui_automator("new UiSelector().text(\"대기\")"),
    Locator::ui_automator("new UiSelector().text(\"앱 닫기\")"),
];

// ============================================================================
// Pace
// ============================================================================

/// Divides every nominal wait, poll interval and pause.
///
/// Real devices run at `Pace::real()`; the in-memory device runs
/// accelerated so flows keep their relative timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    divisor: u32,
}

impl Default for Pace {
    fn default() -> Self {
        Self::real()
    }
}

impl Pace {
    /// Wall-clock timing
    #[must_use]
    pub const fn real() -> Self {
        Self { divisor: 1 }
    }

    /// Every duration divided by `factor` (at least 1)
    #[must_use]
    pub const fn accelerated(factor: u32) -> Self {
        Self {
            divisor: if factor == 0 { 1 } else { factor },
        }
    }

    /// Scale a nominal duration
    #[must_use]
    pub fn scale(&self, nominal: Duration) -> Duration {
        nominal / self.divisor
    }

    /// Scale a nominal poll interval, never below 1ms
    #[must_use]
    pub fn poll_ms(&self, nominal_ms: u64) -> u64 {
        (nominal_ms / u64::from(self.divisor)).max(1)
    }

    /// Sleep for a scaled nominal duration
    pub fn sleep(&self, nominal: Duration) {
        std::thread::sleep(self.scale(nominal));
    }

    /// Scaled settle delays for the device controller
    #[must_use]
    pub fn settle(&self) -> SettleDelays {
        let d = SettleDelays::default();
        SettleDelays {
            after_disable: self.scale(d.after_disable),
            after_enable: self.scale(d.after_enable),
            step: self.scale(d.step),
            foreground: self.scale(d.foreground),
        }
    }
}

// ============================================================================
// ExpectedElement
// ============================================================================

/// A named element a page is expected to show, with an optional exact label
#[derive(Debug, Clone, Copy)]
pub struct ExpectedElement {
    /// Name used in check messages
    pub name: &'static str,
    /// Fallback chain for the element
    pub chain: &'static [Locator],
    /// Expected text or content description
    pub label: Option<&'static str>,
}

impl ExpectedElement {
    /// Element that must be visible
    #[must_use]
    pub const fn new(name: &'static str, chain: &'static [Locator]) -> Self {
        Self {
            name,
            chain,
            label: None,
        }
    }

    /// Element that must be visible and carry `label`
    #[must_use]
    pub const fn labelled(name: &'static str, chain: &'static [Locator], label: &'static str) -> Self {
        Self {
            name,
            chain,
            label: Some(label),
        }
    }
}

// ============================================================================
// PageObject
// ============================================================================

/// A screen of the app under test
pub trait PageObject {
    /// Page name for logging
    fn page_name(&self) -> &'static str;

    /// Shared page actions
    fn base(&self) -> &BasePage<'_>;

    /// Locators whose presence means the page is showing
    fn key_locators(&self) -> &'static [Locator];

    /// Whether any key locator shows up within `timeout`
    fn is_loaded(&self, timeout: Duration) -> bool {
        let started = Instant::now();
        let loaded = self.base().wait_for_page(self.key_locators(), timeout);
        tracing::debug!(page = self.page_name(), loaded, elapsed = ?started.elapsed(), "page load check");
        loaded
    }
}

// ============================================================================
// BasePage
// ============================================================================

/// Actions shared by every page
#[derive(Clone, Copy)]
pub struct BasePage<'s> {
    session: &'s dyn DeviceSession,
    shell: &'s dyn DeviceShell,
    config: &'s AppConfig,
    pace: Pace,
}

impl std::fmt::Debug for BasePage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePage")
            .field("app_package", &self.config.app_package)
            .field("pace", &self.pace)
            .finish_non_exhaustive()
    }
}

impl<'s> BasePage<'s> {
    /// Base over a session and a shell on the same device
    #[must_use]
    pub fn new(session: &'s dyn DeviceSession, shell: &'s dyn DeviceShell, config: &'s AppConfig) -> Self {
        Self {
            session,
            shell,
            config,
            pace: Pace::real(),
        }
    }

    /// Override the pace
    #[must_use]
    pub const fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    /// The automation session
    #[must_use]
    pub fn session(&self) -> &'s dyn DeviceSession {
        self.session
    }

    /// The device shell
    #[must_use]
    pub fn shell(&self) -> &'s dyn DeviceShell {
        self.shell
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &'s AppConfig {
        self.config
    }

    /// Package under test
    #[must_use]
    pub fn app_package(&self) -> &'s str {
        &self.config.app_package
    }

    /// Timing policy
    #[must_use]
    pub const fn pace(&self) -> Pace {
        self.pace
    }

    /// Sleep for a nominal duration
    pub fn sleep(&self, nominal: Duration) {
        self.pace.sleep(nominal);
    }

    /// Resolver with a paced poll interval
    #[must_use]
    pub fn resolver(&self) -> Resolver<'s> {
        Resolver::new(self.session).with_poll_interval(self.pace.poll_ms(DEFAULT_POLL_INTERVAL_MS))
    }

    /// Network and process controller with paced settle delays
    #[must_use]
    pub fn device(&self) -> DeviceController<'s> {
        DeviceController::new(self.session, self.shell).with_delays(self.pace.settle())
    }

    fn toasts(&self) -> ToastDetector<'s> {
        ToastDetector::new(self.session).with_poll_interval(self.pace.poll_ms(TOAST_POLL_INTERVAL_MS))
    }

    fn options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::within(self.pace.scale(timeout))
            .with_poll_interval(self.pace.poll_ms(DEFAULT_POLL_INTERVAL_MS))
    }

    // ------------------------------------------------------------------------
    // Finding and waiting
    // ------------------------------------------------------------------------

    /// Resolve `target` by presence
    pub fn find(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<ElementHandle> {
        self.resolver().find(target, self.pace.scale(timeout))
    }

    /// Resolve `target` once it is displayed
    pub fn wait_for_visible(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<ElementHandle> {
        self.resolver()
            .resolve(target, Condition::Visible, self.pace.scale(timeout))
    }

    /// Resolve `target` once it is displayed and enabled
    pub fn wait_for_clickable(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<ElementHandle> {
        self.resolver()
            .resolve(target, Condition::Clickable, self.pace.scale(timeout))
    }

    /// Resolve `target` once it is in the hierarchy
    pub fn wait_for_present(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<ElementHandle> {
        self.find(target, timeout)
    }

    /// Wait until `locator` is gone or hidden
    pub fn wait_for_absent(&self, locator: &Locator, timeout: Duration) -> ProbeResult<()> {
        Waiter::new(self.session)
            .for_absent(locator, &self.options(timeout))
            .map(|_| ())
    }

    /// Poll a device predicate every `interval` until `timeout`
    pub fn wait_until<F>(&self, waited_for: &str, timeout: Duration, interval: Duration, predicate: F) -> bool
    where
        F: Fn(&dyn DeviceSession) -> ProbeResult<bool>,
    {
        let options = WaitOptions::within(self.pace.scale(timeout))
            .with_poll_interval(self.pace.poll_ms(interval.as_millis() as u64));
        match Waiter::new(self.session).until(waited_for, &options, predicate) {
            Ok(result) => {
                tracing::debug!(waited_for, elapsed = ?result.elapsed, "condition met");
                true
            }
            Err(e) => {
                tracing::debug!(waited_for, error = %e, "condition not met");
                false
            }
        }
    }

    /// Whether `target` becomes present within `timeout`
    pub fn is_element_present(&self, target: impl Into<Target>, timeout: Duration) -> bool {
        self.resolver().is_present(target, self.pace.scale(timeout))
    }

    /// Whether `target` shows up and is displayed within `timeout`
    pub fn is_element_visible(&self, target: impl Into<Target>, timeout: Duration) -> bool {
        self.wait_for_visible(target, timeout).is_ok()
    }

    /// Present-then-visible check used by page load detection
    fn confirm(&self, locator: &Locator, presence: Duration, visible: Duration) -> bool {
        self.is_element_present(locator, presence) && self.is_element_visible(locator, visible)
    }

    /// Whether any of `locators` shows up within `timeout`.
    ///
    /// A quick presence pass first, then rounds of present-and-visible checks
    /// until the deadline.
    pub fn wait_for_page(&self, locators: &[Locator], timeout: Duration) -> bool {
        if locators
            .iter()
            .any(|locator| self.is_element_present(locator, QUICK_CHECK))
        {
            return true;
        }
        let deadline = Instant::now() + self.pace.scale(timeout);
        while Instant::now() < deadline {
            if locators
                .iter()
                .any(|locator| self.confirm(locator, ROUND_PRESENCE, ROUND_VISIBLE))
            {
                return true;
            }
            self.sleep(ROUND_PAUSE);
        }
        false
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Wait until clickable, then click
    pub fn click(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<()> {
        let element = self.wait_for_clickable(target, timeout)?;
        self.session.click(&element)
    }

    /// Resolve, then type `text`
    pub fn type_text(&self, target: impl Into<Target>, text: &str, timeout: Duration) -> ProbeResult<()> {
        let element = self.find(target, timeout)?;
        self.session.send_keys(&element, text)
    }

    /// Empty an input field, falling back to backspaces when `clear` is ignored.
    ///
    /// Returns whether the field reads empty afterwards.
    pub fn clear_text(&self, target: impl Into<Target>) -> ProbeResult<bool> {
        let field = self.find(target, DEFAULT_ACTION_TIMEOUT)?;
        self.session.click(&field)?;
        if let Err(e) = self.session.clear(&field) {
            tracing::debug!(error = %e, "clear failed; using backspace");
        }
        let remaining = self.field_text(&field);
        let presses = remaining.chars().count().min(MAX_BACKSPACES);
        for _ in 0..presses {
            self.session.press_keycode(keycode::DEL)?;
        }
        Ok(self.field_text(&field).is_empty())
    }

    fn field_text(&self, field: &ElementHandle) -> String {
        self.session
            .attribute(field, "text")
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Whether the field shows only mask characters; an empty field is not masked
    pub fn is_input_field_masked(&self, target: impl Into<Target>, timeout: Duration) -> ProbeResult<bool> {
        let field = self.find(target, timeout)?;
        let text = self.field_text(&field);
        Ok(!text.is_empty() && text.chars().all(|c| c == MASK_CHAR))
    }

    /// Visible text, falling back to the content description
    pub fn element_label(&self, element: &ElementHandle) -> ProbeResult<String> {
        let text = self.session.text(element)?;
        if !text.is_empty() {
            return Ok(text);
        }
        Ok(self
            .session
            .attribute(element, "content-desc")?
            .unwrap_or_default())
    }

    /// Whether tapping `target` leaves the current activity unchanged.
    ///
    /// A tap that errors counts as disabled.
    pub fn is_element_effectively_disabled(&self, target: impl Into<Target>) -> ProbeResult<bool> {
        let element = self.find(target, DEFAULT_ACTION_TIMEOUT)?;
        let before = self.session.current_activity()?;
        if let Err(e) = self.session.click(&element) {
            tracing::debug!(error = %e, "tap failed; treating element as disabled");
            return Ok(true);
        }
        self.sleep(DISABLED_CHECK_WAIT);
        let after = self.session.current_activity()?;
        Ok(before == after)
    }

    // ------------------------------------------------------------------------
    // Scrolling and app state
    // ------------------------------------------------------------------------

    /// Scroll the first scrollable container until `text` is on screen
    pub fn scroll_to_text(&self, text: &str) -> ProbeResult<ElementHandle> {
        self.session.find_element(&scroll_text_into_view(text))
    }

    /// Fling the first scrollable container to its end
    pub fn scroll_to_bottom(&self) -> ProbeResult<()> {
        match self.session.find_element(&scroll_to_end(800)) {
            Ok(_) => Ok(()),
            // scrollToEnd yields no element once the list is at its end
            Err(e) if e.is_missing_element() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Send the app to the background for `duration`
    pub fn app_background(&self, duration: Duration) -> ProbeResult<()> {
        self.session.background_app(duration)
    }

    // ------------------------------------------------------------------------
    // Toasts and popups
    // ------------------------------------------------------------------------

    /// Wait for a toast containing `fragment`
    pub fn wait_for_toast(&self, fragment: &str, timeout: Duration) -> ProbeResult<ToastOutcome> {
        self.toasts().wait_for_message(fragment, self.pace.scale(timeout))
    }

    /// Wait for toasts containing `fragment` to go away
    pub fn wait_for_toast_to_disappear(&self, fragment: &str, timeout: Duration) -> ProbeResult<Duration> {
        self.toasts()
            .wait_for_disappear(fragment, self.pace.scale(timeout))
    }

    fn displayed_popup_button(&self) -> Option<ElementHandle> {
        SYSTEM_POPUP_BUTTONS.iter().find_map(|locator| {
            self.session
                .find_elements(locator)
                .ok()?
                .into_iter()
                .find(|element| self.session.is_displayed(element).unwrap_or(false))
        })
    }

    /// Whether a system "not responding" dialog is showing
    #[must_use]
    pub fn system_popup_present(&self) -> bool {
        self.displayed_popup_button().is_some()
    }

    /// Tap the first displayed "대기" / "앱 닫기" button, if any
    pub fn dismiss_system_popup(&self) -> bool {
        let Some(button) = self.displayed_popup_button() else {
            return false;
        };
        match self.session.click(&button) {
            Ok(()) => {
                tracing::info!("system popup dismissed");
                self.sleep(POPUP_PAUSE);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "system popup tap failed");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Page verification
    // ------------------------------------------------------------------------

    fn visible_label(&self, chain: &[Locator]) -> Option<String> {
        chain.iter().find_map(|locator| {
            let element = self.wait_for_visible(locator, ROUND_VISIBLE).ok()?;
            self.element_label(&element).ok().filter(|l| !l.is_empty())
        })
    }

    /// Soft-check that the app is in the foreground and every element is showing.
    ///
    /// Returns whether every check passed.
    pub fn verify_elements(&self, expected: &[ExpectedElement], checks: &mut SoftChecks) -> ProbeResult<bool> {
        match self.session.current_package() {
            Ok(current) if current == self.app_package() => {}
            Ok(current) => {
                checks.fail(format!(
                    "app is not in the foreground: current {current}, expected {}",
                    self.app_package()
                ))?;
                return Ok(false);
            }
            Err(e) => {
                checks.fail(format!("cannot read the foreground package: {e}"))?;
                return Ok(false);
            }
        }

        let mut all_passed = true;
        for element in expected {
            let found = element
                .chain
                .iter()
                .any(|locator| self.confirm(locator, QUICK_CHECK, ROUND_VISIBLE));
            checks.check(found, format!("{} is not on screen", element.name))?;
            all_passed &= found;
        }

        for element in expected {
            let Some(label) = element.label else { continue };
            match self.visible_label(element.chain) {
                Some(actual) => {
                    checks.check_eq(&actual.as_str(), &label, &format!("{} label", element.name))?;
                    all_passed &= actual == label;
                }
                None => {
                    checks.fail(format!("{} label not found", element.name))?;
                    all_passed = false;
                }
            }
        }
        Ok(all_passed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeElement, FakeShell};

    const FIELD: Locator = Locator::xpath("(//android.widget.EditText)[1]");
    const BUTTON: Locator = Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/loginButton\")");
    const TITLE: Locator = Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/title\")");
    const TITLE_XPATH: Locator = Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/title\"]");
    const TITLE_CHAIN: &[Locator] = &[TITLE, TITLE_XPATH];
    const BUTTON_CHAIN: &[Locator] = &[BUTTON];

    struct Rig {
        device: FakeDevice,
        shell: FakeShell,
        config: AppConfig,
    }

    impl Rig {
        fn new() -> Self {
            let device = FakeDevice::new();
            device.activate_app("net.bucketplace").unwrap();
            Self {
                device,
                shell: FakeShell::new(),
                config: AppConfig::default(),
            }
        }

        fn base(&self) -> BasePage<'_> {
            BasePage::new(&self.device, &self.shell, &self.config).with_pace(Pace::accelerated(100))
        }
    }

    mod pace_tests {
        use super::*;

        #[test]
        fn test_scaling() {
            let pace = Pace::accelerated(100);
            assert_eq!(pace.scale(Duration::from_secs(10)), Duration::from_millis(100));
            assert_eq!(pace.poll_ms(100), 1);
            assert_eq!(Pace::accelerated(0), Pace::real());
            assert_eq!(Pace::real().settle(), SettleDelays::default());
        }
    }

    mod input_tests {
        use super::*;

        #[test]
        fn test_clear_text_falls_back_to_backspace() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(FIELD).with_text("qa@ohou.se").stubborn());
            assert!(rig.base().clear_text(FIELD).unwrap());
            assert_eq!(rig.device.text_of(&FIELD).unwrap(), "");
            assert_eq!(
                rig.device.keycodes().iter().filter(|c| **c == keycode::DEL).count(),
                10
            );
        }

        #[test]
        fn test_backspaces_capped() {
            let rig = Rig::new();
            rig.device
                .add(FakeElement::new(FIELD).with_text("x".repeat(80)).stubborn());
            assert!(!rig.base().clear_text(FIELD).unwrap());
            assert_eq!(rig.device.text_of(&FIELD).unwrap().len(), 30);
        }

        #[test]
        fn test_masked_field() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(FIELD).with_text("••••••"));
            assert!(rig.base().is_input_field_masked(FIELD, Duration::from_secs(1)).unwrap());
            rig.device.set_text(&FIELD, "hunter2");
            assert!(!rig.base().is_input_field_masked(FIELD, Duration::from_secs(1)).unwrap());
            rig.device.set_text(&FIELD, "");
            assert!(!rig.base().is_input_field_masked(FIELD, Duration::from_secs(1)).unwrap());
        }

        #[test]
        fn test_type_text_appends() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(FIELD));
            rig.base().type_text(FIELD, "qa@ohou.se", Duration::from_secs(1)).unwrap();
            assert_eq!(rig.device.text_of(&FIELD).unwrap(), "qa@ohou.se");
        }
    }

    mod disabled_tests {
        use super::*;

        #[test]
        fn test_tap_without_navigation_is_disabled() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(BUTTON));
            assert!(rig.base().is_element_effectively_disabled(BUTTON).unwrap());
        }

        #[test]
        fn test_tap_with_navigation_is_enabled() {
            let rig = Rig::new();
            rig.device
                .add(FakeElement::new(BUTTON).on_click(|d| d.set_current_activity(".MainActivity")));
            assert!(!rig.base().is_element_effectively_disabled(BUTTON).unwrap());
        }
    }

    mod page_tests {
        use super::*;

        #[test]
        fn test_wait_for_page_quick_pass() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(TITLE_XPATH));
            assert!(rig.base().wait_for_page(TITLE_CHAIN, Duration::from_secs(10)));
        }

        #[test]
        fn test_wait_for_page_late_element() {
            let rig = Rig::new();
            rig.device
                .add(FakeElement::new(TITLE).appear_after(Duration::from_millis(40)));
            assert!(rig.base().wait_for_page(&[TITLE], Duration::from_secs(10)));
        }

        #[test]
        fn test_wait_for_page_gives_up() {
            let rig = Rig::new();
            let start = Instant::now();
            assert!(!rig.base().wait_for_page(TITLE_CHAIN, Duration::from_secs(5)));
            assert!(start.elapsed() >= Duration::from_millis(50));
        }

        #[test]
        fn test_verify_elements_collects_label_mismatch() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(TITLE_XPATH).with_text("이메일 가입"));
            let expected = [
                ExpectedElement::labelled("title", TITLE_CHAIN, "이메일 로그인"),
                ExpectedElement::new("login button", BUTTON_CHAIN),
            ];
            let mut checks = SoftChecks::new();
            assert!(!rig.base().verify_elements(&expected, &mut checks).unwrap());
            let messages: Vec<_> = checks.failures().iter().map(|f| f.message.clone()).collect();
            assert_eq!(messages.len(), 2);
            assert!(messages[0].contains("login button"));
            assert!(messages[1].contains("이메일 로그인"));
        }

        #[test]
        fn test_verify_elements_requires_foreground_app() {
            let rig = Rig::new();
            rig.device.press_keycode(keycode::HOME).unwrap();
            let mut checks = SoftChecks::new();
            assert!(!rig.base().verify_elements(&[], &mut checks).unwrap());
            assert!(checks.failures()[0].message.contains("not in the foreground"));
        }

        #[test]
        fn test_label_falls_back_to_description() {
            let rig = Rig::new();
            let element = rig
                .device
                .add(FakeElement::new(TITLE).with_attribute("content-desc", "이메일 로그인"));
            assert_eq!(rig.base().element_label(&element).unwrap(), "이메일 로그인");
        }
    }

    mod popup_tests {
        use super::*;

        #[test]
        fn test_dismiss_system_popup() {
            let rig = Rig::new();
            assert!(!rig.base().dismiss_system_popup());
            rig.device.add(
                FakeElement::new(SYSTEM_POPUP_BUTTONS[1].clone())
                    .on_click(|d| d.remove(&SYSTEM_POPUP_BUTTONS[1])),
            );
            assert!(rig.base().system_popup_present());
            assert!(rig.base().dismiss_system_popup());
            assert!(!rig.base().system_popup_present());
        }

        #[test]
        fn test_hidden_popup_ignored() {
            let rig = Rig::new();
            rig.device.add(FakeElement::new(SYSTEM_POPUP_BUTTONS[0].clone()).hidden());
            assert!(!rig.base().dismiss_system_popup());
        }
    }

    #[test]
    fn test_scroll_to_bottom_tolerates_no_match() {
        let rig = Rig::new();
        assert!(rig.base().scroll_to_bottom().is_ok());
    }
}
