//! Email login form.

use crate::assertion::SoftChecks;
use crate::locator::Locator;
use crate::page_object::{BasePage, ExpectedElement, PageObject, DEFAULT_ACTION_TIMEOUT};
use crate::result::ProbeResult;
use crate::toast::toast_locator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::OnceLock;
use std::time::Duration;

/// Toast for an empty email field
pub const TOAST_EMAIL_REQUIRED: &str = "이메일을 입력해주세요.";
/// Toast for an empty password field
pub const TOAST_PASSWORD_REQUIRED: &str = "비밀번호를 입력해주세요.";
/// Progress toast while credentials are checked
pub const TOAST_LOGGING_IN: &str = "로그인 중입니다.";
/// Failed-attempt warning; the app appends ` (n/10)`
pub const TOAST_FAILURE_LIMIT: &str = "10번 실패하면 10분간 로그인이 제한돼요.";
/// Shown once the account is locked out
pub const TOAST_LOCKED: &str = "로그인이 제한되었어요. 10분 후 다시 시도해주세요.";
/// Shown when the API host cannot be resolved
pub const TOAST_HOST_UNRESOLVED: &str =
    "Unable to solve host \"ohous.se\": No address associated with hostname";

/// Failed attempts before lockout
pub const FAILURE_LIMIT: u32 = 10;

const ATTEMPT_PAUSE: Duration = Duration::from_millis(500);

/// Back arrow
pub const BACK_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/backIcon\")"),
    Locator::xpath("//android.widget.ImageView[@resource-id=\"net.bucketplace:id/backIcon\"]"),
];

/// Page title
pub const TITLE: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/title\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/title\"]"),
];

/// Email field
pub const ID_INPUT: &[Locator] = &[
    Locator::xpath("(//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\"])[1]"),
    Locator::ui_automator("new UiSelector().text(\"이메일\")"),
    Locator::xpath(
        "//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\" and @text=\"이메일\"]",
    ),
];

/// Password field
pub const PASSWORD_INPUT: &[Locator] = &[
    Locator::xpath("(//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\"])[2]"),
    Locator::ui_automator("new UiSelector().text(\"비밀번호\")"),
    Locator::xpath(
        "//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\" and @text=\"비밀번호\"]",
    ),
];

/// Submit button
pub const LOGIN_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/loginButton\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/loginButton\"]"),
];

/// Password reset link
pub const PASSWORD_RESET: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/passwordFindingButton\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/passwordFindingButton\"]"),
];

const KEY_LOCATORS: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/title\")"),
    Locator::xpath("(//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\"])[1]"),
    Locator::xpath("(//android.widget.AutoCompleteTextView[@resource-id=\"net.bucketplace:id/inputField\"])[2]"),
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/loginButton\")"),
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/passwordFindingButton\")"),
];

/// Every element of the form, with the labels it must show
pub const ELEMENTS: &[ExpectedElement] = &[
    ExpectedElement::new("back button", BACK_BUTTON),
    ExpectedElement::labelled("title", TITLE, "이메일 로그인"),
    ExpectedElement::labelled("email field", ID_INPUT, "이메일"),
    ExpectedElement::labelled("password field", PASSWORD_INPUT, "비밀번호"),
    ExpectedElement::labelled("login button", LOGIN_BUTTON, "로그인하기"),
    ExpectedElement::labelled("password reset", PASSWORD_RESET, "비밀번호 재설정"),
];

/// Failed attempt counter carried by the failure toast, e.g. `(4/10)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounter {
    /// Failed attempts so far
    pub failed: u32,
    /// Attempts allowed before lockout
    pub limit: u32,
}

const COUNTER_PATTERN: &str = r"\((\d+)\s*/\s*(\d+)\)";

#[allow(clippy::expect_used)]
fn counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COUNTER_PATTERN).expect("counter pattern is a valid literal"))
}

impl FailureCounter {
    /// Parse the last `(n/m)` in a toast text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let captures = counter_pattern().captures_iter(text).last()?;
        Some(Self {
            failed: captures[1].parse().ok()?,
            limit: captures[2].parse().ok()?,
        })
    }

    /// Full failure toast text for the `failed`-th attempt
    #[must_use]
    pub fn toast_text(failed: u32) -> String {
        format!("{TOAST_FAILURE_LIMIT} ({failed}/{FAILURE_LIMIT})")
    }

    /// Whether the next failure locks the account
    #[must_use]
    pub const fn is_last_chance(&self) -> bool {
        self.failed + 1 >= self.limit
    }
}

/// Email login form
#[derive(Debug, Clone, Copy)]
pub struct EmailLoginPage<'s> {
    base: BasePage<'s>,
}

impl<'s> EmailLoginPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Soft-check every form element and label
    pub fn verify_email_login_elements(&self, checks: &mut SoftChecks) -> ProbeResult<bool> {
        self.verify_elements(ELEMENTS, checks)
    }

    /// Tap the back arrow
    pub fn click_back(&self) -> ProbeResult<()> {
        self.click(BACK_BUTTON, DEFAULT_ACTION_TIMEOUT)
    }

    /// Clear the email field and type `email`
    pub fn enter_email(&self, email: &str) -> ProbeResult<()> {
        self.clear_text(ID_INPUT)?;
        self.type_text(ID_INPUT, email, DEFAULT_ACTION_TIMEOUT)
    }

    /// Clear the password field and type `password`
    pub fn enter_password(&self, password: &str) -> ProbeResult<()> {
        self.clear_text(PASSWORD_INPUT)?;
        self.type_text(PASSWORD_INPUT, password, DEFAULT_ACTION_TIMEOUT)
    }

    /// Tap the login button
    pub fn submit(&self) -> ProbeResult<()> {
        self.click(LOGIN_BUTTON, DEFAULT_ACTION_TIMEOUT)
    }

    /// Fill both fields and submit
    pub fn login(&self, email: &str, password: &str) -> ProbeResult<()> {
        self.enter_email(email)?;
        self.enter_password(password)?;
        self.submit()
    }

    /// Submit `count` login attempts back to back
    pub fn attempt_login_multiple_times(&self, email: &str, password: &str, count: u32) -> ProbeResult<()> {
        for attempt in 1..=count {
            tracing::debug!(attempt, of = count, "login attempt");
            self.login(email, password)?;
            self.sleep(ATTEMPT_PAUSE);
        }
        Ok(())
    }

    /// Whether the login button ignores taps
    pub fn is_login_button_disabled(&self) -> ProbeResult<bool> {
        self.is_element_effectively_disabled(LOGIN_BUTTON)
    }

    /// Whether the password field shows mask characters only
    pub fn is_password_masked(&self) -> ProbeResult<bool> {
        self.is_input_field_masked(PASSWORD_INPUT, DEFAULT_ACTION_TIMEOUT)
    }

    /// Read the counter off a failure toast currently on screen
    pub fn read_failure_counter(&self, timeout: Duration) -> ProbeResult<Option<FailureCounter>> {
        let toast = self.wait_for_present(toast_locator(TOAST_FAILURE_LIMIT), timeout)?;
        let text = self.session().text(&toast)?;
        Ok(FailureCounter::parse(&text))
    }
}

impl<'s> Deref for EmailLoginPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageObject for EmailLoginPage<'_> {
    fn page_name(&self) -> &'static str {
        "email login"
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn key_locators(&self) -> &'static [Locator] {
        KEY_LOCATORS
    }
}
