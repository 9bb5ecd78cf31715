//! Social login landing page shown to signed-out users.

use crate::assertion::SoftChecks;
use crate::locator::Locator;
use crate::page_object::{BasePage, ExpectedElement, PageObject, DEFAULT_ACTION_TIMEOUT};
use crate::result::ProbeResult;
use std::ops::Deref;

/// Toast shown after logging out
pub const TOAST_LOGGED_OUT: &str = "로그아웃 되었습니다.";

/// Logo
pub const LOGO: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/logo\")"),
    Locator::xpath("//android.widget.ImageView[@resource-id=\"net.bucketplace:id/logo\"]"),
];

/// Guide illustration
pub const GUIDE_IMAGE: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/guideImage\")"),
    Locator::xpath("//android.widget.ImageView[@resource-id=\"net.bucketplace:id/guideImage\"]"),
];

/// Kakao login button
pub const KAKAO_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/kakaoLoginButton\")"),
    Locator::xpath("//android.view.ViewGroup[@resource-id=\"net.bucketplace:id/kakaoLoginButton\"]"),
];

/// Kakao button icon
pub const KAKAO_ICON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/loginIcon\")"),
    Locator::xpath("//android.widget.ImageView[@resource-id=\"net.bucketplace:id/loginIcon\"]"),
];

/// Kakao button caption
pub const KAKAO_TEXT: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/loginText\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/loginText\"]"),
];

/// Naver login button
pub const NAVER_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/naverLoginButton\")"),
    Locator::xpath("//android.widget.ImageView[@content-desc=\"네이버로 가입하기\"]"),
];

/// Facebook login button
pub const FACEBOOK_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/facebookLoginButton\")"),
    Locator::xpath("//android.widget.ImageView[@content-desc=\"페이스북으로 가입하기\"]"),
];

/// Apple login button
pub const APPLE_BUTTON: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/appleLoginButton\")"),
    Locator::xpath("//android.widget.ImageView[@content-desc=\"애플로그인으로 가입하기\"]"),
];

/// "이메일로 로그인" link
pub const EMAIL_LOGIN: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/emailLogInText\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/emailLogInText\"]"),
];

/// "이메일로 가입" link
pub const EMAIL_SIGN_UP: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/emailSignUpText\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/emailSignUpText\"]"),
];

/// Customer service link
pub const CUSTOMER_SERVICE: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/customerServiceText\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/customerServiceText\"]"),
];

/// Guest order lookup link
pub const ANONYMOUS_ORDER: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/anonymousOrderCheck\")"),
    Locator::xpath("//android.widget.TextView[@resource-id=\"net.bucketplace:id/anonymousOrderCheck\"]"),
];

const KEY_LOCATORS: &[Locator] = &[
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/logo\")"),
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/guideImage\")"),
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/kakaoLoginButton\")"),
    Locator::ui_automator("new UiSelector().resourceId(\"net.bucketplace:id/emailLogInText\")"),
    Locator::ui_automator("new UiSelector().text(\"이메일로 로그인\")"),
    Locator::ui_automator("new UiSelector().text(\"카카오로 로그인\")"),
];

/// Every element of the landing page, with the labels it must show
pub const ELEMENTS: &[ExpectedElement] = &[
    ExpectedElement::new("logo", LOGO),
    ExpectedElement::new("guide image", GUIDE_IMAGE),
    ExpectedElement::new("kakao login button", KAKAO_BUTTON),
    ExpectedElement::new("kakao login icon", KAKAO_ICON),
    ExpectedElement::labelled("kakao login text", KAKAO_TEXT, "카카오톡으로 계속하기"),
    ExpectedElement::new("naver login button", NAVER_BUTTON),
    ExpectedElement::new("facebook login button", FACEBOOK_BUTTON),
    ExpectedElement::new("apple login button", APPLE_BUTTON),
    ExpectedElement::labelled("email login", EMAIL_LOGIN, "이메일로 로그인"),
    ExpectedElement::labelled("email sign up", EMAIL_SIGN_UP, "이메일로 가입"),
    ExpectedElement::labelled("customer service", CUSTOMER_SERVICE, "로그인에 문제가 있으신가요?"),
    ExpectedElement::labelled("guest order lookup", ANONYMOUS_ORDER, "비회원 주문 조회하기"),
];

/// Social login landing page
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'s> {
    base: BasePage<'s>,
}

impl<'s> LoginPage<'s> {
    /// Page over `base`
    #[must_use]
    pub const fn new(base: BasePage<'s>) -> Self {
        Self { base }
    }

    /// Soft-check every landing page element and label
    pub fn verify_login_elements(&self, checks: &mut SoftChecks) -> ProbeResult<bool> {
        self.verify_elements(ELEMENTS, checks)
    }

    /// Open the email login form
    pub fn click_email_login(&self) -> ProbeResult<()> {
        self.click(EMAIL_LOGIN, DEFAULT_ACTION_TIMEOUT)
    }
}

impl<'s> Deref for LoginPage<'s> {
    type Target = BasePage<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl PageObject for LoginPage<'_> {
    fn page_name(&self) -> &'static str {
        "login"
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    fn key_locators(&self) -> &'static [Locator] {
        KEY_LOCATORS
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeElement};
    use crate::pages::test_rig::Rig;
    use std::time::Duration;

    fn show_landing(device: &FakeDevice) {
        for expected in ELEMENTS {
            let element = FakeElement::new(expected.chain[0].clone());
            device.add(match expected.label {
                Some(label) => element.with_text(label),
                None => element,
            });
        }
    }

    #[test]
    fn test_landing_page_passes_verification() {
        let rig = Rig::in_app();
        show_landing(&rig.device);
        let page = LoginPage::new(rig.base());
        assert!(page.is_loaded(Duration::from_secs(10)));
        let mut checks = SoftChecks::new();
        assert!(page.verify_login_elements(&mut checks).unwrap());
        assert!(checks.all_passed());
        assert_eq!(checks.check_count(), ELEMENTS.len() + 5);
    }

    #[test]
    fn test_fallback_locator_counts() {
        let rig = Rig::in_app();
        show_landing(&rig.device);
        rig.device.remove(&NAVER_BUTTON[0]);
        rig.device.add(FakeElement::new(NAVER_BUTTON[1].clone()));
        let mut checks = SoftChecks::new();
        assert!(LoginPage::new(rig.base())
            .verify_login_elements(&mut checks)
            .unwrap());
    }

    #[test]
    fn test_wrong_label_reported() {
        let rig = Rig::in_app();
        show_landing(&rig.device);
        rig.device.set_text(&KAKAO_TEXT[0], "카카오로 시작하기");
        let mut checks = SoftChecks::new();
        assert!(!LoginPage::new(rig.base())
            .verify_login_elements(&mut checks)
            .unwrap());
        assert_eq!(checks.failures().len(), 1);
        assert!(checks.failures()[0].message.contains("kakao login text"));
    }

    #[test]
    fn test_not_loaded_on_blank_screen() {
        let rig = Rig::in_app();
        assert!(!LoginPage::new(rig.base()).is_loaded(Duration::from_secs(2)));
    }
}
