//! Direct device control: network radios and app termination

use crate::commands::NetworkAction;
use crate::error::{CliError, CliResult};
use ohouse_probe::device::SettleDelays;
use ohouse_probe::{with_fixture, AppLaunch, DeviceController, ProbeResult, SessionFactory, SessionFixture};

/// Run `body` with a controller on a bare session (the app is not launched)
pub fn with_controller<T>(
    factory: &dyn SessionFactory,
    delays: SettleDelays,
    body: impl FnOnce(&DeviceController<'_>) -> ProbeResult<T>,
) -> CliResult<T> {
    let mut fixture = SessionFixture::new(factory, AppLaunch::SkipLaunch);
    let value = with_fixture(&mut fixture, |fixture| {
        let controller = DeviceController::new(fixture.session()?, fixture.shell()?).with_delays(delays);
        body(&controller)
    })?;
    Ok(value)
}

/// Apply a network action; returns the line to print
pub fn network(factory: &dyn SessionFactory, delays: SettleDelays, action: NetworkAction) -> CliResult<String> {
    with_controller(factory, delays, |controller| {
        let switched = match action {
            NetworkAction::Status => true,
            NetworkAction::Enable => controller.enable_network()?,
            NetworkAction::Disable => controller.disable_network()?,
        };
        let connected = controller.is_network_connected()?;
        Ok((switched, connected))
    })
    .and_then(|(switched, connected)| {
        if !switched {
            return Err(CliError::device(format!("network {action:?} was rejected by the device")));
        }
        let state = if connected { "connected" } else { "disconnected" };
        Ok(format!("network: {state}"))
    })
}

/// Stop `package` and return to the launcher; returns the line to print
pub fn terminate(factory: &dyn SessionFactory, delays: SettleDelays, package: &str) -> CliResult<String> {
    let installed = with_controller(factory, delays, |controller| {
        if !controller.is_app_installed(package)? {
            return Ok(false);
        }
        controller.terminate_all_apps(package)
    })?;
    if installed {
        Ok(format!("terminated {package}"))
    } else {
        Err(CliError::invalid_argument(format!("{package} is not installed")))
    }
}
