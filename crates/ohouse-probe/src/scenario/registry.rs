//! Every scenario the suite knows about, in run order.

use super::{install, login, Scenario};

/// Install first, then the login chain in id order
#[must_use]
pub fn all_scenarios() -> Vec<Scenario> {
    install::SCENARIOS
        .iter()
        .chain(login::SCENARIOS.iter())
        .copied()
        .collect()
}

/// Scenario with exactly `id` (case-insensitive)
#[must_use]
pub fn find_scenario(id: &str) -> Option<Scenario> {
    all_scenarios()
        .into_iter()
        .find(|s| s.id.eq_ignore_ascii_case(id))
}
