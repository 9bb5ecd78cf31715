//! Install from the Play Store.

use super::{Prelude, Priority, Scenario, ScenarioContext};
use crate::assertion::ensure;
use crate::config::{AppLaunch, PLAY_STORE_PACKAGE};
use crate::device::best_effort;
use crate::pages::playstore::DEFAULT_SEARCH_RETRIES;
use crate::pages::search_results::{DEFAULT_RETRIES, INSTALL_COMPLETE_TIMEOUT};
use crate::pages::{PlayStorePage, SearchResultsPage};
use crate::result::ProbeResult;
use std::time::Duration;

const APP_NAME: &str = "오늘의집";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const INSTALL_START: Duration = Duration::from_secs(2);

pub(super) const SCENARIOS: [Scenario; 1] = [Scenario {
    id: "INSTALL_001",
    title: "install the app from the Play Store",
    priority: Priority::P1,
    launch: AppLaunch::SkipLaunch,
    prelude: Prelude::PlayStore,
    run: install_from_store,
}];

fn install_from_store(ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
    let base = ctx.base();
    let store = PlayStorePage::new(base);
    let results = SearchResultsPage::new(base);

    store.search_app(APP_NAME, DEFAULT_SEARCH_RETRIES)?;
    ensure(
        results.wait_for_search_results(PAGE_TIMEOUT),
        "search results did not load",
    )?;

    results.select_app(DEFAULT_RETRIES)?;
    ensure(
        results.wait_for_app_detail_page(PAGE_TIMEOUT),
        "app detail page did not load",
    )?;

    results.install_app(DEFAULT_RETRIES)?;
    ctx.sleep(INSTALL_START);
    if results.is_install_button_displayed() {
        ctx.checks
            .warn("install button is still displayed; install may not have started");
    }
    ensure(
        !store.system_popup_present(),
        "an error popup appeared during install",
    )?;
    ensure(
        results.wait_for_install_complete(INSTALL_COMPLETE_TIMEOUT),
        "\"열기\" did not appear; install did not complete",
    )?;

    best_effort(
        base.device().terminate_all_apps(PLAY_STORE_PACKAGE),
        "close the Play Store",
    );
    Ok(())
}
