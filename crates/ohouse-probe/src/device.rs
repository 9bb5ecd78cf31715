//! Device network and process control.
//!
//! Radio toggles, package queries and force-stops go through the device
//! shell; foreground checks and key events through the session. Every call is
//! a fresh device query. Operations report failure as `Ok(false)` or `Err`;
//! [`best_effort`] turns that into a logged default at the call site so one
//! flaky adb command never aborts a scenario.

use crate::result::{ProbeError, ProbeResult};
use crate::session::{device_serial, keycode, DeviceSession};
use crate::shell::{CommandOutput, DeviceShell, DEFAULT_SHELL_TIMEOUT};
use crate::wait::{poll, WaitOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Foreground polls while waiting for a terminated app to leave
pub const TERMINATE_CHECK_RETRIES: u32 = 5;

/// Interval between keep-alive touches during long waits
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Fixed sleeps after state-changing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After disabling radios
    pub after_disable: Duration,
    /// After enabling radios
    pub after_enable: Duration,
    /// Between escalation steps and foreground polls
    pub step: Duration,
    /// After the app reached the foreground
    pub foreground: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            after_disable: Duration::from_secs(3),
            after_enable: Duration::from_secs(5),
            step: Duration::from_millis(500),
            foreground: Duration::from_secs(2),
        }
    }
}

impl SettleDelays {
    /// No sleeping at all
    #[must_use]
    pub const fn none() -> Self {
        Self {
            after_disable: Duration::ZERO,
            after_enable: Duration::ZERO,
            step: Duration::ZERO,
            foreground: Duration::ZERO,
        }
    }
}

/// Emulators report WiFi as permanently on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    /// `emulator-NNNN`
    Emulator,
    /// Anything else
    Physical,
}

impl DeviceClass {
    /// Classify by adb serial
    #[must_use]
    pub fn from_serial(serial: &str) -> Self {
        if serial.starts_with("emulator-") {
            Self::Emulator
        } else {
            Self::Physical
        }
    }
}

/// Turn a best-effort result into a value, logging any error
pub fn best_effort<T: Default>(result: ProbeResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation = what, error = %e, "device operation failed; continuing");
        T::default()
    })
}

/// Network and process control for one device
#[derive(Clone, Copy)]
pub struct DeviceController<'a> {
    session: &'a dyn DeviceSession,
    shell: &'a dyn DeviceShell,
    delays: SettleDelays,
}

impl std::fmt::Debug for DeviceController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceController")
            .field("delays", &self.delays)
            .finish_non_exhaustive()
    }
}

impl<'a> DeviceController<'a> {
    /// Controller over a session and a shell on the same device
    #[must_use]
    pub fn new(session: &'a dyn DeviceSession, shell: &'a dyn DeviceShell) -> Self {
        Self {
            session,
            shell,
            delays: SettleDelays::default(),
        }
    }

    /// Override settle delays
    #[must_use]
    pub const fn with_delays(mut self, delays: SettleDelays) -> Self {
        self.delays = delays;
        self
    }

    /// adb serial of the device
    #[must_use]
    pub fn serial(&self) -> String {
        device_serial(&self.session.capabilities())
    }

    /// Emulator or physical device
    #[must_use]
    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::from_serial(&self.serial())
    }

    fn run(&self, args: &[&str]) -> ProbeResult<CommandOutput> {
        self.shell.shell(args, DEFAULT_SHELL_TIMEOUT)
    }

    fn global_setting(&self, key: &str) -> ProbeResult<String> {
        let out = self.run(&["settings", "get", "global", key])?;
        if !out.success() {
            return Err(ProbeError::device(
                format!("settings get global {key}"),
                describe_failure(&out),
            ));
        }
        Ok(out.stdout_trimmed().to_string())
    }

    // ========================================================================
    // Network
    // ========================================================================

    /// Turn off mobile data and WiFi, then settle
    pub fn disable_network(&self) -> ProbeResult<bool> {
        self.set_radios(false)
    }

    /// Turn on mobile data and WiFi, then settle
    pub fn enable_network(&self) -> ProbeResult<bool> {
        self.set_radios(true)
    }

    fn set_radios(&self, enable: bool) -> ProbeResult<bool> {
        let serial = self.serial();
        let action = if enable { "enable" } else { "disable" };
        tracing::info!(%serial, action, "switching radios");

        for radio in ["data", "wifi"] {
            let out = self.run(&["svc", radio, action])?;
            if !out.success() {
                tracing::error!(%serial, radio, action, reason = %describe_failure(&out), "radio command failed");
                return Ok(false);
            }
            tracing::debug!(%serial, radio, action, "radio switched");
        }

        std::thread::sleep(if enable {
            self.delays.after_enable
        } else {
            self.delays.after_disable
        });
        tracing::info!(%serial, action, "radios switched");
        Ok(true)
    }

    /// Whether the device has a usable data path.
    ///
    /// Airplane mode wins. Emulators count mobile data only; physical devices
    /// count WiFi or mobile data.
    pub fn is_network_connected(&self) -> ProbeResult<bool> {
        if self.global_setting("airplane_mode_on")? == "1" {
            tracing::debug!("airplane mode on");
            return Ok(false);
        }
        let data_on = self.global_setting("mobile_data")? == "1";
        match self.device_class() {
            DeviceClass::Emulator => {
                tracing::debug!(data_on, "emulator network state");
                Ok(data_on)
            }
            DeviceClass::Physical => {
                let wifi_on = self.global_setting("wifi_on")? == "1";
                tracing::debug!(data_on, wifi_on, "device network state");
                Ok(wifi_on || data_on)
            }
        }
    }

    // ========================================================================
    // Packages and processes
    // ========================================================================

    /// Whether `package` is installed
    pub fn is_app_installed(&self, package: &str) -> ProbeResult<bool> {
        let out = self.run(&["pm", "list", "packages", package])?;
        if !out.success() {
            return Err(ProbeError::device("pm list packages", describe_failure(&out)));
        }
        let wanted = format!("package:{package}");
        Ok(out.stdout.lines().any(|line| line.trim() == wanted))
    }

    /// Go to the home screen
    pub fn press_home(&self) -> ProbeResult<()> {
        self.session.press_keycode(keycode::HOME)
    }

    /// Stop `package` and leave the device on the home screen.
    ///
    /// Escalates HOME, graceful terminate, `am force-stop`, `killall`, then
    /// waits a bounded number of polls for the foreground to change. Only the
    /// closing HOME press can fail the operation, so calling this for an app
    /// that is not running succeeds.
    pub fn terminate_all_apps(&self, package: &str) -> ProbeResult<bool> {
        let step = self.delays.step;

        if let Err(e) = self.press_home() {
            tracing::warn!(error = %e, "initial HOME press failed");
        }
        std::thread::sleep(step);

        match self.session.terminate_app(package) {
            Ok(was_running) => tracing::debug!(package, was_running, "terminate_app"),
            Err(e) => tracing::debug!(package, error = %e, "terminate_app failed"),
        }
        std::thread::sleep(step);

        let force_stop = ["am", "force-stop", package];
        let killall = ["killall", package];
        for args in [&force_stop[..], &killall[..]] {
            match self.run(args) {
                Ok(out) if out.success() => tracing::debug!(?args, "process command done"),
                Ok(out) => tracing::debug!(?args, reason = %describe_failure(&out), "process command failed"),
                Err(e) => tracing::debug!(?args, error = %e, "process command not run"),
            }
            std::thread::sleep(step);
        }

        let mut left = false;
        for _ in 0..TERMINATE_CHECK_RETRIES {
            match self.session.current_package() {
                Ok(current) if current != package => {
                    left = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "foreground unknown; assuming terminated");
                    left = true;
                    break;
                }
            }
            std::thread::sleep(step);
        }
        if !left {
            tracing::warn!(package, "app still in foreground after termination attempts");
        }

        self.press_home()?;
        std::thread::sleep(step);
        tracing::debug!(package, left, "termination finished");
        Ok(true)
    }

    /// Wait until `package` is in the foreground, then settle
    pub fn wait_for_foreground(&self, package: &str, timeout: Duration) -> ProbeResult<()> {
        let options = WaitOptions::within(timeout).with_poll_interval(1_000);
        poll(&options, &format!("{package} in foreground"), || {
            Ok((self.session.current_package()? == package).then_some(()))
        })?;
        std::thread::sleep(self.delays.foreground);
        Ok(())
    }

    /// Sleep for `total`, touching the session every `interval` so the server
    /// does not reap it. Returns `false` as soon as a touch fails.
    pub fn wait_with_keepalive(&self, total: Duration, interval: Duration) -> bool {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let chunk = interval.min(total - elapsed);
            std::thread::sleep(chunk);
            elapsed += chunk;
            match self.session.current_package() {
                Ok(_) => tracing::debug!(?elapsed, ?total, "session kept alive"),
                Err(e) => {
                    tracing::warn!(?elapsed, error = %e, "session check failed during long wait");
                    return false;
                }
            }
            if interval.is_zero() {
                break;
            }
        }
        true
    }
}

fn describe_failure(out: &CommandOutput) -> String {
    if out.timed_out {
        return "timed out".to_string();
    }
    let stderr = out.stderr.trim();
    match out.status {
        Some(code) if stderr.is_empty() => format!("exit status {code}"),
        Some(code) => format!("exit status {code}: {stderr}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{FakeDevice, FakeShell, LAUNCHER_PACKAGE};
    use serde_json::json;

    const APP: &str = "net.bucketplace";

    fn physical() -> FakeDevice {
        FakeDevice::new().with_capabilities(json!({"udid": "R3CN90ABCDE", "deviceName": "Galaxy S23"}))
    }

    fn controller<'a>(device: &'a FakeDevice, shell: &'a FakeShell) -> DeviceController<'a> {
        DeviceController::new(device, shell).with_delays(SettleDelays::none())
    }

    mod network_state_tests {
        use super::*;

        #[test]
        fn test_emulator_ignores_wifi() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.set_setting("mobile_data", "0");
            shell.set_setting("wifi_on", "1");
            assert_eq!(controller(&device, &shell).device_class(), DeviceClass::Emulator);
            assert!(!controller(&device, &shell).is_network_connected().unwrap());
        }

        #[test]
        fn test_physical_uses_wifi_or_data() {
            let device = physical();
            let shell = FakeShell::new();
            shell.set_setting("mobile_data", "0");
            shell.set_setting("wifi_on", "1");
            assert!(controller(&device, &shell).is_network_connected().unwrap());
            shell.set_setting("wifi_on", "0");
            assert!(!controller(&device, &shell).is_network_connected().unwrap());
        }

        #[test]
        fn test_airplane_mode_short_circuits() {
            let device = physical();
            let shell = FakeShell::new();
            shell.set_setting("airplane_mode_on", "1");
            assert!(!controller(&device, &shell).is_network_connected().unwrap());
            assert!(!shell.calls().iter().any(|c| c.contains("wifi_on")));
        }

        #[test]
        fn test_query_failure_is_error_and_best_effort_false() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.respond("settings get global airplane_mode_on", CommandOutput::timeout());
            let result = controller(&device, &shell).is_network_connected();
            assert!(result.is_err());
            assert!(!best_effort(result, "is_network_connected"));
        }
    }

    mod radio_tests {
        use super::*;

        #[test]
        fn test_disable_then_enable() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            let ctl = controller(&device, &shell);
            assert!(ctl.disable_network().unwrap());
            assert!(!ctl.is_network_connected().unwrap());
            assert!(ctl.enable_network().unwrap());
            assert!(ctl.is_network_connected().unwrap());
            assert_eq!(
                shell.calls()[..2],
                ["svc data disable".to_string(), "svc wifi disable".to_string()]
            );
        }

        #[test]
        fn test_failed_radio_command_is_false() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.respond("svc data", CommandOutput::failed(255, "Permission denial"));
            assert!(!controller(&device, &shell).disable_network().unwrap());
            assert!(!shell.calls().iter().any(|c| c.starts_with("svc wifi")));
        }

        #[test]
        fn test_unreachable_adb_is_error() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.fail_to_spawn("svc");
            let result = controller(&device, &shell).enable_network();
            assert!(matches!(result, Err(ProbeError::Device { .. })));
            assert!(!best_effort(result, "enable_network"));
        }
    }

    mod process_tests {
        use super::*;

        #[test]
        fn test_terminate_running_app() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            device.activate_app(APP).unwrap();
            assert!(controller(&device, &shell).terminate_all_apps(APP).unwrap());
            assert_eq!(device.current_package().unwrap(), LAUNCHER_PACKAGE);
            assert!(shell.calls().contains(&format!("am force-stop {APP}")));
            assert_eq!(device.keycodes(), vec![keycode::HOME, keycode::HOME]);
        }

        #[test]
        fn test_terminate_is_idempotent() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            let ctl = controller(&device, &shell);
            assert!(ctl.terminate_all_apps(APP).unwrap());
            assert!(ctl.terminate_all_apps(APP).unwrap());
            assert_eq!(device.current_package().unwrap(), LAUNCHER_PACKAGE);
        }

        #[test]
        fn test_terminate_survives_shell_outage() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.fail_to_spawn("am");
            shell.fail_to_spawn("killall");
            device.activate_app(APP).unwrap();
            assert!(controller(&device, &shell).terminate_all_apps(APP).is_ok());
        }

        #[test]
        fn test_terminate_fails_only_when_home_fails() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            device.set_failing(true);
            let result = controller(&device, &shell).terminate_all_apps(APP);
            assert!(result.is_err());
            assert!(!best_effort(result, "terminate_all_apps"));
        }

        #[test]
        fn test_installed_requires_exact_package() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            shell.install("net.bucketplace.dev");
            let ctl = controller(&device, &shell);
            assert!(!ctl.is_app_installed(APP).unwrap());
            shell.install(APP);
            assert!(ctl.is_app_installed(APP).unwrap());
        }

        #[test]
        fn test_wait_for_foreground() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            let ctl = controller(&device, &shell);
            assert!(ctl.wait_for_foreground(APP, Duration::from_millis(10)).is_err());
            device.activate_app(APP).unwrap();
            assert!(ctl.wait_for_foreground(APP, Duration::from_millis(10)).is_ok());
        }
    }

    mod keepalive_tests {
        use super::*;

        #[test]
        fn test_keepalive_touches_session() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            let ok = controller(&device, &shell)
                .wait_with_keepalive(Duration::from_millis(30), Duration::from_millis(10));
            assert!(ok);
        }

        #[test]
        fn test_keepalive_stops_on_dead_session() {
            let device = FakeDevice::new();
            let shell = FakeShell::new();
            device.set_failing(true);
            let ok = controller(&device, &shell)
                .wait_with_keepalive(Duration::from_secs(60), Duration::from_millis(5));
            assert!(!ok);
        }
    }

    #[test]
    fn test_describe_failure() {
        assert_eq!(describe_failure(&CommandOutput::timeout()), "timed out");
        assert_eq!(
            describe_failure(&CommandOutput::failed(1, "no process killed\n")),
            "exit status 1: no process killed"
        );
    }
}
