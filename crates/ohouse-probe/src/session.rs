//! The device session capability set.
//!
//! Everything above this module talks to the device through [`DeviceSession`];
//! [`crate::appium::AppiumSession`] speaks it over HTTP and
//! [`crate::mock::FakeDevice`] scripts it in memory.

use crate::locator::Locator;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Android key codes sent through `press_keycode`
pub mod keycode {
    /// KEYCODE_HOME
    pub const HOME: u32 = 3;
    /// KEYCODE_BACK
    pub const BACK: u32 = 4;
    /// KEYCODE_ENTER
    pub const ENTER: u32 = 66;
    /// KEYCODE_DEL (backspace)
    pub const DEL: u32 = 67;
}

/// Opaque reference to an element found on screen.
///
/// Holds only the server-side id. Displayed/enabled/text state is re-queried
/// through the session every time it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Wrap a server-side element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Server-side element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A screen coordinate in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Capability set of a connected device/app instance.
///
/// A session is used serially by one scenario at a time. Every call is a fresh
/// device query; nothing is cached.
pub trait DeviceSession {
    /// Find the first element matching `locator`.
    ///
    /// Absence is reported as an error for which
    /// [`is_missing_element`](crate::result::ProbeError::is_missing_element) holds.
    fn find_element(&self, locator: &Locator) -> ProbeResult<ElementHandle>;

    /// Find every element matching `locator` (possibly none)
    fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>>;

    /// Click an element
    fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type into an element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Rendered text
    fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Attribute value (`content-desc`, `checked`, ...)
    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Whether the element is currently displayed
    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element is currently enabled
    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Inject an Android key event
    fn press_keycode(&self, keycode: u32) -> ProbeResult<()>;

    /// Bring an app to the foreground
    fn activate_app(&self, package: &str) -> ProbeResult<()>;

    /// Gracefully terminate an app; `Ok(false)` if it was not running
    fn terminate_app(&self, package: &str) -> ProbeResult<bool>;

    /// Package of the foreground app
    fn current_package(&self) -> ProbeResult<String>;

    /// Activity of the foreground app
    fn current_activity(&self) -> ProbeResult<String>;

    /// Send the app to the background for `duration`, then restore it
    fn background_app(&self, duration: Duration) -> ProbeResult<()>;

    /// Drag a finger from `from` to `to`
    fn swipe(&self, from: Point, to: Point, duration: Duration) -> ProbeResult<()>;

    /// PNG screenshot of the current screen
    fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Capabilities the session was created with (as returned by the server)
    fn capabilities(&self) -> serde_json::Value;

    /// End the session; further calls fail
    fn quit(&self) -> ProbeResult<()>;
}

/// Serial used for `adb -s` when the capabilities do not name one
pub const DEFAULT_DEVICE_SERIAL: &str = "emulator-5554";

/// Device serial for shell commands: `udid`, then `deviceName`, then the emulator default
#[must_use]
pub fn device_serial(capabilities: &serde_json::Value) -> String {
    ["udid", "appium:udid", "deviceName", "appium:deviceName"]
        .iter()
        .find_map(|key| capabilities.get(key).and_then(serde_json::Value::as_str))
        .filter(|serial| !serial.is_empty())
        .unwrap_or(DEFAULT_DEVICE_SERIAL)
        .to_string()
}
