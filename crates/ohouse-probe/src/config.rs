//! Suite configuration.
//!
//! Read once at start-up from defaults, an optional YAML file and the process
//! environment (highest precedence), then passed around by reference.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Appium server the suite talks to by default
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4723";
/// App under test
pub const DEFAULT_APP_PACKAGE: &str = "net.bucketplace";
/// Launch activity of the app under test
pub const DEFAULT_APP_ACTIVITY: &str = "se.ohou.screen.splash.SplashActivity";
/// Google Play Store package
pub const PLAY_STORE_PACKAGE: &str = "com.android.vending";

/// Seconds the server keeps an idle session alive
pub const NEW_COMMAND_TIMEOUT_SECS: u64 = 1200;
/// UiAutomator2 server launch timeout
pub const UIAUTOMATOR2_LAUNCH_TIMEOUT_MS: u64 = 90_000;

/// Whether a new session should start the app under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppLaunch {
    /// Include `appPackage`/`appActivity` so the server launches the app
    Launch,
    /// Open a bare device session (install flows start from the Play Store)
    SkipLaunch,
}

/// Login credentials for the test account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Appium server URL (`APPIUM_SERVER_URL`)
    pub appium_server_url: String,
    /// Platform name (`PLATFORM_NAME`)
    pub platform_name: String,
    /// Platform version, omitted from capabilities when empty (`PLATFORM_VERSION`)
    pub platform_version: String,
    /// Device name / adb serial (`DEVICE_NAME`)
    pub device_name: String,
    /// Automation backend (`AUTOMATION_NAME`)
    pub automation_name: String,
    /// Package under test (`APP_PACKAGE`)
    pub app_package: String,
    /// Launch activity (`APP_ACTIVITY`)
    pub app_activity: String,
    /// Test account email (`LOGIN_ID`)
    pub login_id: Option<String>,
    /// Test account password (`LOGIN_PASSWORD`)
    pub login_password: Option<String>,
    /// adb binary (`ADB_PATH`)
    pub adb_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            appium_server_url: DEFAULT_SERVER_URL.to_string(),
            platform_name: "Android".to_string(),
            platform_version: String::new(),
            device_name: "emulator-5554".to_string(),
            automation_name: "UiAutomator2".to_string(),
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            app_activity: DEFAULT_APP_ACTIVITY.to_string(),
            login_id: None,
            login_password: None,
            adb_path: "adb".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().merge_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults, then `path`, then the process environment
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        Ok(base.merge_lookup(|key| std::env::var(key).ok()))
    }

    /// Parse a YAML file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(serde_yaml_ng::from_str(&text)?)
    }

    /// Override fields from a key lookup (environment variable names)
    #[must_use]
    pub fn merge_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |field: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        };
        set(&mut self.appium_server_url, "APPIUM_SERVER_URL");
        set(&mut self.platform_name, "PLATFORM_NAME");
        set(&mut self.platform_version, "PLATFORM_VERSION");
        set(&mut self.device_name, "DEVICE_NAME");
        set(&mut self.automation_name, "AUTOMATION_NAME");
        set(&mut self.app_package, "APP_PACKAGE");
        set(&mut self.app_activity, "APP_ACTIVITY");
        set(&mut self.adb_path, "ADB_PATH");
        if let Some(id) = lookup("LOGIN_ID").filter(|v| !v.is_empty()) {
            self.login_id = Some(id);
        }
        if let Some(password) = lookup("LOGIN_PASSWORD").filter(|v| !v.is_empty()) {
            self.login_password = Some(password);
        }
        self
    }

    /// Test account credentials, or a `Config` error naming what is missing
    pub fn credentials(&self) -> ProbeResult<Credentials> {
        let email = self
            .login_id
            .clone()
            .ok_or_else(|| ProbeError::config("LOGIN_ID is not set"))?;
        let password = self
            .login_password
            .clone()
            .ok_or_else(|| ProbeError::config("LOGIN_PASSWORD is not set"))?;
        Ok(Credentials { email, password })
    }

    /// W3C `alwaysMatch` capabilities for a new session
    #[must_use]
    pub fn capabilities(&self, launch: AppLaunch) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(self.platform_name));
        caps.insert("appium:deviceName".into(), json!(self.device_name));
        caps.insert("appium:automationName".into(), json!(self.automation_name));
        caps.insert("appium:newCommandTimeout".into(), json!(NEW_COMMAND_TIMEOUT_SECS));
        caps.insert("appium:noReset".into(), json!(true));
        caps.insert(
            "appium:uiautomator2ServerLaunchTimeout".into(),
            json!(UIAUTOMATOR2_LAUNCH_TIMEOUT_MS),
        );
        if !self.platform_version.is_empty() {
            caps.insert("appium:platformVersion".into(), json!(self.platform_version));
        }
        if launch == AppLaunch::Launch {
            caps.insert("appium:appPackage".into(), json!(self.app_package));
            caps.insert("appium:appActivity".into(), json!(self.app_activity));
        }
        caps
    }

    /// Copy safe to print or log
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            login_password: self.login_password.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod source_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = AppConfig::default();
            assert_eq!(config.appium_server_url, "http://127.0.0.1:4723");
            assert_eq!(config.app_package, "net.bucketplace");
            assert!(config.login_id.is_none());
        }

        #[test]
        fn test_lookup_overrides() {
            let config = AppConfig::default().merge_lookup(lookup(&[
                ("DEVICE_NAME", "R3CN90"),
                ("LOGIN_ID", "qa@ohou.se"),
                ("LOGIN_PASSWORD", ""),
            ]));
            assert_eq!(config.device_name, "R3CN90");
            assert_eq!(config.login_id.as_deref(), Some("qa@ohou.se"));
            assert!(config.login_password.is_none());
        }

        #[test]
        fn test_yaml_file_keeps_defaults_for_missing_keys() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "device_name: emulator-5556\nlogin_id: qa@ohou.se").unwrap();
            let config = AppConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.device_name, "emulator-5556");
            assert_eq!(config.automation_name, "UiAutomator2");
        }

        #[test]
        fn test_missing_yaml_file_is_config_error() {
            let err = AppConfig::from_yaml_file(Path::new("/nonexistent/probe.yaml")).unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }
    }

    mod credential_tests {
        use super::*;

        #[test]
        fn test_missing_credentials_named() {
            let err = AppConfig::default().credentials().unwrap_err();
            assert!(err.to_string().contains("LOGIN_ID"));
            let config = AppConfig {
                login_id: Some("qa@ohou.se".into()),
                ..AppConfig::default()
            };
            assert!(config.credentials().unwrap_err().to_string().contains("LOGIN_PASSWORD"));
        }

        #[test]
        fn test_debug_masks_password() {
            let creds = Credentials {
                email: "qa@ohou.se".into(),
                password: "hunter2".into(),
            };
            assert!(!format!("{creds:?}").contains("hunter2"));
        }

        #[test]
        fn test_redacted() {
            let config = AppConfig {
                login_password: Some("hunter2".into()),
                ..AppConfig::default()
            };
            assert_eq!(config.redacted().login_password.as_deref(), Some("********"));
        }
    }

    mod capability_tests {
        use super::*;

        #[test]
        fn test_launch_capabilities() {
            let caps = AppConfig::default().capabilities(AppLaunch::Launch);
            assert_eq!(caps["appium:appPackage"], "net.bucketplace");
            assert_eq!(caps["appium:newCommandTimeout"], 1200);
            assert_eq!(caps["appium:noReset"], true);
            assert!(!caps.contains_key("appium:platformVersion"));
        }

        #[test]
        fn test_skip_launch_omits_app() {
            let config = AppConfig {
                platform_version: "14".into(),
                ..AppConfig::default()
            };
            let caps = config.capabilities(AppLaunch::SkipLaunch);
            assert!(!caps.contains_key("appium:appPackage"));
            assert_eq!(caps["appium:platformVersion"], "14");
        }
    }
}
