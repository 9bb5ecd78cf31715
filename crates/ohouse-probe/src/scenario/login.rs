//! Launch, login and logout journeys.
//!
//! `LOGIN_004` through `LOGIN_013` run as a chain: each one starts on the
//! screen the previous one left behind, and none of them terminates the app.

use super::{Prelude, Priority, Scenario, ScenarioContext};
use crate::assertion::ensure;
use crate::config::AppLaunch;
use crate::device::{best_effort, DEFAULT_KEEPALIVE_INTERVAL};
use crate::pages::{AppDrawerPage, EmailLoginPage, FailureCounter, LoginPage, MainHomePage, SplashPage};
use crate::pages::email_login::{
    TOAST_EMAIL_REQUIRED, TOAST_FAILURE_LIMIT, TOAST_HOST_UNRESOLVED, TOAST_LOCKED, TOAST_LOGGING_IN,
    TOAST_PASSWORD_REQUIRED,
};
use crate::pages::login::TOAST_LOGGED_OUT;
use crate::pages::splash::SPLASH_TIMEOUT;
use crate::result::ProbeResult;
use std::time::Duration;

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const SLOW_PAGE_TIMEOUT: Duration = Duration::from_secs(20);
const RECHECK_TIMEOUT: Duration = Duration::from_secs(5);
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(20);
const TOAST_TIMEOUT: Duration = Duration::from_secs(5);
const LOGGING_IN_APPEAR: Duration = Duration::from_millis(500);
const LOGGING_IN_DISAPPEAR: Duration = Duration::from_secs(10);
const PROMPT_CHECK: Duration = Duration::from_secs(1);
const AFTER_COUNTER_TOAST: Duration = Duration::from_secs(1);
const LOCKED_RETRY_PAUSE: Duration = Duration::from_secs(10);
const LOCKOUT_WAIT: Duration = Duration::from_secs(590);

const WRONG_PASSWORD: &str = "wrong_password";

const fn scenario(
    id: &'static str,
    title: &'static str,
    priority: Priority,
    run: super::ScenarioFn,
) -> Scenario {
    Scenario {
        id,
        title,
        priority,
        launch: AppLaunch::SkipLaunch,
        prelude: Prelude::None,
        run,
    }
}

pub(super) const SCENARIOS: [Scenario; 13] = [
    scenario("LOGIN_001", "first launch with a healthy network", Priority::P1, first_launch),
    scenario("LOGIN_002", "first launch without network", Priority::P2, first_launch_offline),
    scenario("LOGIN_003", "login page elements and labels", Priority::P3, login_page_ui),
    scenario("LOGIN_004", "email login opens from the login page", Priority::P1, open_email_login),
    scenario("LOGIN_005", "back arrow returns to the login page", Priority::P2, email_login_back),
    scenario("LOGIN_006", "email login elements and labels", Priority::P3, email_login_ui),
    scenario("LOGIN_007", "login button ignores empty fields", Priority::P2, empty_fields),
    scenario("LOGIN_008", "login with the test account", Priority::P1, login_success),
    scenario("LOGIN_009", "wrong password shows the failure counter", Priority::P2, wrong_password),
    scenario("LOGIN_010", "successful login resets the failure counter", Priority::P3, counter_reset),
    scenario("LOGIN_011", "ten failures lock login for ten minutes", Priority::P3, lockout),
    scenario("LOGIN_012", "login while offline, then online", Priority::P3, network_drop),
    scenario("LOGIN_013", "relaunch keeps the user logged in", Priority::P3, relaunch_logged_in),
];

// ============================================================================
// Shared steps
// ============================================================================

fn terminate_app(ctx: &ScenarioContext<'_>) {
    let base = ctx.base();
    best_effort(base.device().terminate_all_apps(base.app_package()), "terminate app");
}

fn login_page_loaded(ctx: &mut ScenarioContext<'_>, timeout: Duration) -> ProbeResult<bool> {
    let page = LoginPage::new(ctx.base());
    ctx.check_loaded(&page, timeout)
}

fn email_page_loaded(ctx: &mut ScenarioContext<'_>, timeout: Duration) -> ProbeResult<bool> {
    let page = EmailLoginPage::new(ctx.base());
    ctx.check_loaded(&page, timeout)
}

fn home_loaded(ctx: &mut ScenarioContext<'_>) -> ProbeResult<bool> {
    let page = MainHomePage::new(ctx.base());
    ctx.check_loaded(&page, PAGE_TIMEOUT)
}

fn logout(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    if let Err(e) = MainHomePage::new(ctx.base()).logout(LOGOUT_TIMEOUT) {
        ctx.checks.fail(e.to_string())?;
    }
    Ok(())
}

/// Log out and come back to the email form
fn logout_to_email_form(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    logout(ctx)?;
    login_page_loaded(ctx, PAGE_TIMEOUT)?;
    LoginPage::new(ctx.base()).click_email_login()?;
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    Ok(())
}

fn submit_and_expect(ctx: &mut ScenarioContext<'_>, email: &str, password: &str, toast: &str) -> ProbeResult<()> {
    EmailLoginPage::new(ctx.base()).login(email, password)?;
    ctx.check_toast_cycle(TOAST_LOGGING_IN, LOGGING_IN_APPEAR, LOGGING_IN_DISAPPEAR)?;
    ctx.check_toast_cycle(toast, TOAST_TIMEOUT, TOAST_TIMEOUT)
}

fn network_connected(ctx: &ScenarioContext<'_>) -> bool {
    best_effort(ctx.base().device().is_network_connected(), "read network state")
}

// ============================================================================
// Launch
// ============================================================================

fn launch_from_drawer(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let base = ctx.base();
    let drawer = AppDrawerPage::new(base);
    ensure(drawer.wait_for_app_installed(PAGE_TIMEOUT), "app is not installed")?;
    drawer.launch_app()?;

    // Splash visibility is reported, not asserted.
    let splash = SplashPage::new(base);
    if !splash.wait_for_lottie(SPLASH_TIMEOUT) {
        ctx.checks.warn("splash animation was not seen");
    }

    ensure(drawer.wait_for_app_running(PAGE_TIMEOUT), "app did not reach the foreground")?;
    login_page_loaded(ctx, PAGE_TIMEOUT)?;
    Ok(())
}

fn first_launch(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    ensure(network_connected(ctx), "network is not connected")?;
    launch_from_drawer(ctx)?;
    terminate_app(ctx);
    Ok(())
}

fn first_launch_offline(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let base = ctx.base();
    ensure(
        AppDrawerPage::new(base).wait_for_app_installed(PAGE_TIMEOUT),
        "app is not installed",
    )?;
    let device = base.device();
    ensure(
        best_effort(device.disable_network(), "disable network"),
        "could not disable the network",
    )?;

    let result = ensure(!network_connected(ctx), "network is still connected")
        .and_then(|()| launch_from_drawer(ctx));

    best_effort(device.enable_network(), "restore network");
    terminate_app(ctx);
    result
}

fn login_page_ui(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let launched = AppDrawerPage::new(ctx.base()).pre_processing_launch()?;
    ensure(launched, "app did not start from the drawer")?;
    login_page_loaded(ctx, SLOW_PAGE_TIMEOUT)?;
    let page = LoginPage::new(ctx.base());
    page.verify_login_elements(&mut ctx.checks)?;
    terminate_app(ctx);
    Ok(())
}

// ============================================================================
// Email login form
// ============================================================================

fn open_email_login(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let launched = AppDrawerPage::new(ctx.base()).pre_processing_launch()?;
    ensure(launched, "app did not start from the drawer")?;
    login_page_loaded(ctx, PAGE_TIMEOUT)?;
    LoginPage::new(ctx.base()).click_email_login()?;
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    Ok(())
}

fn email_login_back(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    EmailLoginPage::new(ctx.base()).click_back()?;
    login_page_loaded(ctx, PAGE_TIMEOUT)?;
    Ok(())
}

fn email_login_ui(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    login_page_loaded(ctx, PAGE_TIMEOUT)?;
    LoginPage::new(ctx.base()).click_email_login()?;
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    let page = EmailLoginPage::new(ctx.base());
    page.verify_email_login_elements(&mut ctx.checks)?;
    Ok(())
}

fn empty_fields(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    const CASES: [(&str, &str, &str); 3] = [
        ("", "", TOAST_EMAIL_REQUIRED),
        ("test@test.com", "", TOAST_PASSWORD_REQUIRED),
        ("", "test1234", TOAST_EMAIL_REQUIRED),
    ];

    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    for (round, (email, password, toast)) in CASES.into_iter().enumerate() {
        if round > 0 {
            email_page_loaded(ctx, RECHECK_TIMEOUT)?;
        }
        let page = EmailLoginPage::new(ctx.base());
        page.enter_email(email)?;
        page.enter_password(password)?;
        let disabled = page.is_login_button_disabled()?;
        ctx.checks.check(
            disabled,
            format!("login button is enabled with email {email:?} and password {password:?}"),
        )?;
        ctx.check_toast_cycle(toast, TOAST_TIMEOUT, TOAST_TIMEOUT)?;
    }
    Ok(())
}

// ============================================================================
// Credentials
// ============================================================================

fn login_success(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    let credentials = ctx.credentials()?;
    EmailLoginPage::new(ctx.base()).login(&credentials.email, &credentials.password)?;
    ctx.check_toast_cycle(TOAST_LOGGING_IN, LOGGING_IN_APPEAR, LOGGING_IN_DISAPPEAR)?;

    let home = MainHomePage::new(ctx.base());
    if home.is_password_manager_prompt_present(PROMPT_CHECK) {
        home.dismiss_password_manager_prompt(PROMPT_CHECK);
    }
    home_loaded(ctx)?;
    Ok(())
}

fn wrong_password(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let credentials = ctx.credentials()?;
    logout_to_email_form(ctx)?;

    let page = EmailLoginPage::new(ctx.base());
    page.enter_email(&credentials.email)?;
    page.enter_password(WRONG_PASSWORD)?;
    let masked = page.is_password_masked()?;
    ctx.checks.check(masked, "password field is not masked")?;

    page.submit()?;
    ctx.check_toast_cycle(TOAST_FAILURE_LIMIT, TOAST_TIMEOUT, TOAST_TIMEOUT)
}

fn counter_reset(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    let credentials = ctx.credentials()?;
    EmailLoginPage::new(ctx.base()).attempt_login_multiple_times(&credentials.email, WRONG_PASSWORD, 3)?;

    submit_and_expect(
        ctx,
        &credentials.email,
        WRONG_PASSWORD,
        &FailureCounter::toast_text(4),
    )?;
    ctx.sleep(AFTER_COUNTER_TOAST);

    EmailLoginPage::new(ctx.base()).login(&credentials.email, &credentials.password)?;
    home_loaded(ctx)?;

    logout_to_email_form(ctx)?;
    EmailLoginPage::new(ctx.base()).login(&credentials.email, WRONG_PASSWORD)?;
    ctx.check_toast_cycle(&FailureCounter::toast_text(1), TOAST_TIMEOUT, TOAST_TIMEOUT)
}

fn lockout(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    email_page_loaded(ctx, PAGE_TIMEOUT)?;
    let credentials = ctx.credentials()?;
    EmailLoginPage::new(ctx.base()).attempt_login_multiple_times(&credentials.email, WRONG_PASSWORD, 9)?;

    submit_and_expect(ctx, &credentials.email, WRONG_PASSWORD, TOAST_LOCKED)?;

    ctx.sleep(LOCKED_RETRY_PAUSE);
    submit_and_expect(ctx, &credentials.email, WRONG_PASSWORD, TOAST_LOCKED)?;

    let base = ctx.base();
    let pace = base.pace();
    let alive = base
        .device()
        .wait_with_keepalive(pace.scale(LOCKOUT_WAIT), pace.scale(DEFAULT_KEEPALIVE_INTERVAL));
    ensure(alive, "session dropped while waiting out the lockout")?;

    EmailLoginPage::new(ctx.base()).login(&credentials.email, &credentials.password)?;
    home_loaded(ctx)?;
    Ok(())
}

// ============================================================================
// Network and relaunch
// ============================================================================

fn network_drop(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    logout(ctx)?;
    ctx.check_toast_cycle(TOAST_LOGGED_OUT, TOAST_TIMEOUT, TOAST_TIMEOUT)?;
    LoginPage::new(ctx.base()).click_email_login()?;
    email_page_loaded(ctx, PAGE_TIMEOUT)?;

    let credentials = ctx.credentials()?;
    let page = EmailLoginPage::new(ctx.base());
    page.enter_email(&credentials.email)?;
    page.enter_password(&credentials.password)?;

    let device = ctx.base().device();
    ensure(
        best_effort(device.disable_network(), "disable network"),
        "could not disable the network",
    )?;
    let offline = ensure(!network_connected(ctx), "network is still connected")
        .and_then(|()| page.submit())
        .and_then(|()| {
            ctx.check_toast_cycle(TOAST_LOGGING_IN, LOGGING_IN_APPEAR, LOGGING_IN_DISAPPEAR)
        })
        .and_then(|()| ctx.check_toast_cycle(TOAST_HOST_UNRESOLVED, TOAST_TIMEOUT, TOAST_TIMEOUT));

    best_effort(device.enable_network(), "enable network");
    offline?;
    ensure(network_connected(ctx), "network did not come back")?;

    page.login(&credentials.email, &credentials.password)?;
    home_loaded(ctx)?;
    Ok(())
}

fn relaunch_logged_in(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let base = ctx.base();
    let terminated = best_effort(base.device().terminate_all_apps(base.app_package()), "terminate app");
    ensure(terminated, "could not terminate the app")?;
    AppDrawerPage::new(base).launch_app()?;
    home_loaded(ctx)?;
    Ok(())
}
