//! Scripted stand-in for the app on a fake device.
//!
//! Screens are rebuilt by click and key hooks, so page models and scenarios
//! drive it exactly as they would drive the real app.

#![allow(dead_code)]

use ohouse_probe::config::{AppConfig, DEFAULT_APP_PACKAGE};
use ohouse_probe::mock::{FakeDevice, FakeElement, FakeSessionFactory, FakeShell};
use ohouse_probe::pages::app_drawer::{APP_DRAWER_BUTTON, APP_ICON};
use ohouse_probe::pages::email_login::{
    self, FailureCounter, FAILURE_LIMIT, TOAST_EMAIL_REQUIRED, TOAST_HOST_UNRESOLVED, TOAST_LOCKED,
    TOAST_LOGGING_IN, TOAST_PASSWORD_REQUIRED,
};
use ohouse_probe::pages::login::{self, TOAST_LOGGED_OUT};
use ohouse_probe::pages::main_home::{
    COMMUNITY_BUTTON, HOME_BUTTON, HOME_TOP_TAB, INTERIOR_BUTTON, MY_PAGE_BUTTON,
    PASSWORD_MANAGER_DISMISS, PASSWORD_MANAGER_PROMPT, SHOPPING_BUTTON,
};
use ohouse_probe::pages::my_page::{GEAR_ICON, PROFILE_TAB, SHOPPING_TAB};
use ohouse_probe::pages::setting::LOGOUT_BUTTON;
use ohouse_probe::session::keycode;
use ohouse_probe::Locator;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

pub const EMAIL: &str = "qa@ohou.se";
pub const PASSWORD: &str = "correct-horse";

const TOAST_LIFETIME: Duration = Duration::from_millis(20);
const RESULT_DELAY: Duration = Duration::from_millis(10);
const PROGRESS_LIFETIME: Duration = Duration::from_millis(10);

const SETTINGS_TITLE: Locator = Locator::ui_automator("new UiSelector().text(\"설정\").instance(1)");
const SETTINGS_ACCOUNT: Locator = Locator::ui_automator("new UiSelector().text(\"내 정보 관리\")");

#[derive(Default)]
struct Account {
    logged_in: Cell<bool>,
    failures: Cell<u32>,
    save_prompt: Cell<bool>,
}

/// The app, the device it runs on and the shell of that device
#[derive(Clone)]
pub struct FakeApp {
    pub device: Rc<FakeDevice>,
    pub shell: Rc<FakeShell>,
    account: Rc<Account>,
}

impl FakeApp {
    /// Installed, not running, signed out, launcher on screen
    pub fn installed() -> Self {
        let app = Self {
            device: Rc::new(FakeDevice::new()),
            shell: Rc::new(FakeShell::new()),
            account: Rc::new(Account::default()),
        };
        app.shell.install(DEFAULT_APP_PACKAGE);
        let on_home = app.clone();
        app.device
            .on_key(keycode::HOME, move |d| on_home.show_launcher(d));
        app.show_launcher(&app.device);
        app
    }

    /// Show the password manager save prompt after each successful login
    pub fn with_save_prompt(self) -> Self {
        self.account.save_prompt.set(true);
        self
    }

    pub fn config() -> AppConfig {
        AppConfig {
            login_id: Some(EMAIL.to_string()),
            login_password: Some(PASSWORD.to_string()),
            ..AppConfig::default()
        }
    }

    /// Factory handing out the same device for every session
    pub fn factory(&self) -> FakeSessionFactory {
        let app = self.clone();
        FakeSessionFactory::new(move |_| {
            app.device.revive();
            (app.device.clone(), app.shell.clone())
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.account.logged_in.get()
    }

    pub fn failures(&self) -> u32 {
        self.account.failures.get()
    }

    fn online(&self) -> bool {
        self.shell.setting("mobile_data").as_deref() == Some("1")
    }

    // ------------------------------------------------------------------------
    // Screens
    // ------------------------------------------------------------------------

    fn show_launcher(&self, d: &FakeDevice) {
        d.clear_screen();
        let app = self.clone();
        d.add(FakeElement::new(APP_DRAWER_BUTTON).on_click(move |d| {
            d.clear_screen();
            let app = app.clone();
            d.add(FakeElement::new(APP_ICON).on_click(move |d| app.launch(d)));
        }));
    }

    fn launch(&self, d: &FakeDevice) {
        d.set_current_package(DEFAULT_APP_PACKAGE);
        if self.is_logged_in() {
            self.show_home(d);
        } else {
            self.show_landing(d);
        }
    }

    fn show_landing(&self, d: &FakeDevice) {
        d.clear_screen();
        d.set_current_activity(".LoginActivity");
        for expected in login::ELEMENTS {
            let mut element = FakeElement::new(expected.chain[0].clone());
            if let Some(label) = expected.label {
                element = element.with_text(label);
            }
            if expected.chain == login::EMAIL_LOGIN {
                let app = self.clone();
                element = element.on_click(move |d| app.show_email_form(d));
            }
            d.add(element);
        }
    }

    fn show_email_form(&self, d: &FakeDevice) {
        d.clear_screen();
        d.set_current_activity(".EmailLoginActivity");
        let back = self.clone();
        d.add(FakeElement::new(email_login::BACK_BUTTON[0].clone()).on_click(move |d| back.show_landing(d)));
        d.add(FakeElement::new(email_login::TITLE[0].clone()).with_text("이메일 로그인"));
        d.add(FakeElement::new(email_login::ID_INPUT[0].clone()).with_attribute("content-desc", "이메일"));
        d.add(
            FakeElement::new(email_login::PASSWORD_INPUT[0].clone())
                .with_attribute("content-desc", "비밀번호")
                .masked(),
        );
        let submit = self.clone();
        d.add(
            FakeElement::new(email_login::LOGIN_BUTTON[0].clone())
                .with_text("로그인하기")
                .on_click(move |d| submit.submit(d)),
        );
        d.add(FakeElement::new(email_login::PASSWORD_RESET[0].clone()).with_text("비밀번호 재설정"));
    }

    fn show_home(&self, d: &FakeDevice) {
        d.clear_screen();
        d.set_current_activity(".MainActivity");
        for locator in [HOME_TOP_TAB, HOME_BUTTON, COMMUNITY_BUTTON, SHOPPING_BUTTON, INTERIOR_BUTTON] {
            d.add(FakeElement::new(locator));
        }
        let app = self.clone();
        d.add(FakeElement::new(MY_PAGE_BUTTON).on_click(move |d| app.show_my_page(d)));
    }

    fn show_save_prompt(&self, d: &FakeDevice) {
        d.add(FakeElement::new(PASSWORD_MANAGER_PROMPT[0].clone()));
        d.add(FakeElement::new(PASSWORD_MANAGER_DISMISS[0].clone()).on_click(|d| {
            d.remove(&PASSWORD_MANAGER_PROMPT[0]);
            d.remove(&PASSWORD_MANAGER_DISMISS[0]);
        }));
    }

    fn show_my_page(&self, d: &FakeDevice) {
        d.clear_screen();
        d.set_current_activity(".MyPageActivity");
        d.add(FakeElement::new(PROFILE_TAB));
        d.add(FakeElement::new(SHOPPING_TAB));
        let app = self.clone();
        d.add(FakeElement::new(GEAR_ICON).on_click(move |d| app.show_settings(d)));
    }

    fn show_settings(&self, d: &FakeDevice) {
        d.clear_screen();
        d.set_current_activity(".SettingActivity");
        d.add(FakeElement::new(SETTINGS_TITLE));
        d.add(FakeElement::new(SETTINGS_ACCOUNT));
        let app = self.clone();
        d.add(FakeElement::new(LOGOUT_BUTTON).on_click(move |d| {
            app.account.logged_in.set(false);
            app.show_landing(d);
            d.show_toast(TOAST_LOGGED_OUT, TOAST_LIFETIME);
        }));
    }

    // ------------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------------

    fn submit(&self, d: &FakeDevice) {
        let email = d.text_of(&email_login::ID_INPUT[0]).unwrap_or_default();
        let password = d.text_of(&email_login::PASSWORD_INPUT[0]).unwrap_or_default();
        if email.is_empty() {
            d.show_toast(TOAST_EMAIL_REQUIRED, TOAST_LIFETIME);
            return;
        }
        if password.is_empty() {
            d.show_toast(TOAST_PASSWORD_REQUIRED, TOAST_LIFETIME);
            return;
        }

        let account = &self.account;
        let verdict = if !self.online() {
            TOAST_HOST_UNRESOLVED.to_string()
        } else if account.failures.get() >= FAILURE_LIMIT {
            TOAST_LOCKED.to_string()
        } else if email == EMAIL && password == PASSWORD {
            account.failures.set(0);
            account.logged_in.set(true);
            self.show_home(d);
            if account.save_prompt.get() {
                self.show_save_prompt(d);
            }
            d.show_toast(TOAST_LOGGING_IN, PROGRESS_LIFETIME);
            return;
        } else {
            let failed = account.failures.get() + 1;
            account.failures.set(failed);
            if failed >= FAILURE_LIMIT {
                TOAST_LOCKED.to_string()
            } else {
                FailureCounter::toast_text(failed)
            }
        };

        d.show_toast(TOAST_LOGGING_IN, PROGRESS_LIFETIME);
        d.show_toast_after(verdict, RESULT_DELAY, TOAST_LIFETIME);
    }
}
