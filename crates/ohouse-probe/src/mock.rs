//! In-memory device doubles.
//!
//! [`FakeDevice`] scripts a screen of elements and toasts behind the
//! [`DeviceSession`] trait; [`FakeShell`] keeps a small model of device
//! settings and installed packages behind [`DeviceShell`]. Page models and
//! scenarios run against them unchanged.

use crate::fixture::{AppLaunch, OpenedSession, SessionFactory};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{keycode, DeviceSession, ElementHandle, Point};
use crate::shell::{CommandOutput, DeviceShell};
use crate::toast::toast_fragment;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Package reported after HOME or after the foreground app is terminated
pub const LAUNCHER_PACKAGE: &str = "com.google.android.apps.nexuslauncher";

/// Activity reported for the launcher
pub const LAUNCHER_ACTIVITY: &str = ".NexusLauncherActivity";

/// PNG signature returned by [`FakeDevice::screenshot`]
pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Callback run against the device when an element is clicked or a key pressed
pub type DeviceHook = Rc<dyn Fn(&FakeDevice)>;

// ============================================================================
// FakeElement
// ============================================================================

/// Scripted element
#[derive(Clone)]
pub struct FakeElement {
    locator: Locator,
    text: String,
    attributes: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    appear_after: Duration,
    stubborn: bool,
    masked: bool,
    on_click: Option<DeviceHook>,
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeElement")
            .field("locator", &self.locator)
            .field("text", &self.text)
            .field("displayed", &self.displayed)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl FakeElement {
    /// Displayed, enabled element matched by `locator`
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            text: String::new(),
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            appear_after: Duration::ZERO,
            stubborn: false,
            masked: false,
            on_click: None,
        }
    }

    /// Rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attribute value
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// In the hierarchy but not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Displayed but not enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Not in the hierarchy until `delay` after being added
    #[must_use]
    pub const fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// `clear` leaves the text in place; only DEL key presses remove it
    #[must_use]
    pub const fn stubborn(mut self) -> Self {
        self.stubborn = true;
        self
    }

    /// Password field: reads back one mask character per typed character
    #[must_use]
    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    fn rendered_text(&self) -> String {
        if self.masked {
            "\u{2022}".repeat(self.text.chars().count())
        } else {
            self.text.clone()
        }
    }

    /// Run `hook` after each click
    #[must_use]
    pub fn on_click(mut self, hook: impl Fn(&FakeDevice) + 'static) -> Self {
        self.on_click = Some(Rc::new(hook));
        self
    }
}

// ============================================================================
// FakeDevice
// ============================================================================

struct Entry {
    id: String,
    element: FakeElement,
    added: Instant,
}

impl Entry {
    fn attached(&self) -> bool {
        self.added.elapsed() >= self.element.appear_after
    }
}

struct Toast {
    id: String,
    text: String,
    shown: Instant,
    delay: Duration,
    lifetime: Duration,
}

impl Toast {
    fn alive(&self) -> bool {
        let elapsed = self.shown.elapsed();
        elapsed >= self.delay && elapsed < self.delay + self.lifetime
    }

    fn pending(&self) -> bool {
        self.shown.elapsed() < self.delay + self.lifetime
    }
}

struct State {
    elements: Vec<Entry>,
    toasts: Vec<Toast>,
    current_package: String,
    current_activity: String,
    focused: Option<String>,
    calls: Vec<String>,
    queries: Vec<String>,
    keycodes: Vec<u32>,
    key_hooks: Vec<(u32, DeviceHook)>,
    next_id: u64,
    quit: bool,
    failing: bool,
}

/// Scripted [`DeviceSession`]
pub struct FakeDevice {
    state: RefCell<State>,
    finds: Cell<usize>,
    capabilities: serde_json::Value,
}

impl std::fmt::Debug for FakeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FakeDevice")
            .field("elements", &state.elements.len())
            .field("current_package", &state.current_package)
            .finish_non_exhaustive()
    }
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn no_such_element(locator: &Locator) -> ProbeError {
    ProbeError::Protocol {
        error: "no such element".to_string(),
        message: format!("no element matches {locator}"),
    }
}

fn stale(id: &str) -> ProbeError {
    ProbeError::Protocol {
        error: "stale element reference".to_string(),
        message: format!("element {id} is no longer attached"),
    }
}

impl FakeDevice {
    /// Empty screen with the launcher in the foreground
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                elements: Vec::new(),
                toasts: Vec::new(),
                current_package: LAUNCHER_PACKAGE.to_string(),
                current_activity: LAUNCHER_ACTIVITY.to_string(),
                focused: None,
                calls: Vec::new(),
                queries: Vec::new(),
                keycodes: Vec::new(),
                key_hooks: Vec::new(),
                next_id: 0,
                quit: false,
                failing: false,
            }),
            finds: Cell::new(0),
            capabilities: serde_json::json!({
                "platformName": "Android",
                "deviceName": "emulator-5554",
            }),
        }
    }

    /// Replace the reported capabilities
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: serde_json::Value) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Put an element on screen
    pub fn add(&self, element: FakeElement) -> ElementHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = format!("el-{}", state.next_id);
        state.elements.push(Entry {
            id: id.clone(),
            element,
            added: Instant::now(),
        });
        ElementHandle::new(id)
    }

    /// Remove every element matched by `locator`
    pub fn remove(&self, locator: &Locator) {
        self.state
            .borrow_mut()
            .elements
            .retain(|entry| &entry.element.locator != locator);
    }

    /// Remove every element and toast
    pub fn clear_screen(&self) {
        let mut state = self.state.borrow_mut();
        state.elements.clear();
        state.toasts.clear();
    }

    /// Stored text of the first element matched by `locator`, unmasked
    #[must_use]
    pub fn text_of(&self, locator: &Locator) -> Option<String> {
        self.state
            .borrow()
            .elements
            .iter()
            .find(|entry| &entry.element.locator == locator)
            .map(|entry| entry.element.text.clone())
    }

    /// Overwrite the text of every element matched by `locator`
    pub fn set_text(&self, locator: &Locator, text: &str) {
        for entry in &mut self.state.borrow_mut().elements {
            if &entry.element.locator == locator {
                entry.element.text = text.to_string();
            }
        }
    }

    /// Show a toast for `lifetime`
    pub fn show_toast(&self, text: impl Into<String>, lifetime: Duration) {
        self.show_toast_after(text, Duration::ZERO, lifetime);
    }

    /// Show a toast `delay` from now for `lifetime`
    pub fn show_toast_after(&self, text: impl Into<String>, delay: Duration, lifetime: Duration) {
        let mut state = self.state.borrow_mut();
        state.toasts.retain(Toast::pending);
        state.next_id += 1;
        let id = format!("toast-{}", state.next_id);
        state.toasts.push(Toast {
            id,
            text: text.into(),
            shown: Instant::now(),
            delay,
            lifetime,
        });
    }

    /// Set the foreground package
    pub fn set_current_package(&self, package: &str) {
        self.state.borrow_mut().current_package = package.to_string();
    }

    /// Foreground package, readable after the session was quit
    #[must_use]
    pub fn foreground_package(&self) -> String {
        self.state.borrow().current_package.clone()
    }

    /// Set the foreground activity
    pub fn set_current_activity(&self, activity: &str) {
        self.state.borrow_mut().current_activity = activity.to_string();
    }

    /// Make every query fail as if the server went away
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    /// Run `hook` whenever `code` is pressed
    pub fn on_key(&self, code: u32, hook: impl Fn(&Self) + 'static) {
        self.state.borrow_mut().key_hooks.push((code, Rc::new(hook)));
    }

    /// Key codes pressed so far
    #[must_use]
    pub fn keycodes(&self) -> Vec<u32> {
        self.state.borrow().keycodes.clone()
    }

    /// Action log (`click:<locator>`, `activate:<package>`, ...)
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Number of clicks on elements matched by `locator`
    #[must_use]
    pub fn clicks(&self, locator: &Locator) -> usize {
        let wanted = format!("click:{locator}");
        self.state.borrow().calls.iter().filter(|c| **c == wanted).count()
    }

    /// Number of find requests served
    #[must_use]
    pub fn find_count(&self) -> usize {
        self.finds.get()
    }

    /// Number of find requests for `locator`
    #[must_use]
    pub fn queries_for(&self, locator: &Locator) -> usize {
        let wanted = locator.to_string();
        self.state.borrow().queries.iter().filter(|q| **q == wanted).count()
    }

    fn count_query(&self, locator: &Locator) {
        self.finds.set(self.finds.get() + 1);
        self.state.borrow_mut().queries.push(locator.to_string());
    }

    /// Whether `quit` was called
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.state.borrow().quit
    }

    /// Accept commands again after `quit`, like a new session on the same device
    pub fn revive(&self) {
        self.state.borrow_mut().quit = false;
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check_alive(&self) -> ProbeResult<()> {
        let state = self.state.borrow();
        if state.quit {
            return Err(ProbeError::Protocol {
                error: "invalid session id".to_string(),
                message: "session was deleted".to_string(),
            });
        }
        if state.failing {
            return Err(ProbeError::Protocol {
                error: "unknown error".to_string(),
                message: "instrumentation process is not running".to_string(),
            });
        }
        Ok(())
    }

    fn matching(&self, locator: &Locator) -> Vec<ElementHandle> {
        let state = self.state.borrow();
        if let Some(fragment) = toast_fragment(locator) {
            return state
                .toasts
                .iter()
                .filter(|toast| toast.alive() && toast.text.contains(&fragment))
                .map(|toast| ElementHandle::new(toast.id.clone()))
                .collect();
        }
        state
            .elements
            .iter()
            .filter(|entry| &entry.element.locator == locator && entry.attached())
            .map(|entry| ElementHandle::new(entry.id.clone()))
            .collect()
    }

    fn with_entry<T>(
        &self,
        element: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> ProbeResult<T> {
        self.check_alive()?;
        let mut state = self.state.borrow_mut();
        state
            .elements
            .iter_mut()
            .find(|entry| entry.id == element.id())
            .map(|entry| f(&mut entry.element))
            .ok_or_else(|| stale(element.id()))
    }

    fn toast_text(&self, element: &ElementHandle) -> Option<ProbeResult<String>> {
        if !element.id().starts_with("toast-") {
            return None;
        }
        let state = self.state.borrow();
        Some(
            state
                .toasts
                .iter()
                .find(|toast| toast.id == element.id() && toast.alive())
                .map(|toast| toast.text.clone())
                .ok_or_else(|| stale(element.id())),
        )
    }
}

impl DeviceSession for FakeDevice {
    fn find_element(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.count_query(locator);
        self.check_alive()?;
        self.matching(locator)
            .into_iter()
            .next()
            .ok_or_else(|| no_such_element(locator))
    }

    fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.count_query(locator);
        self.check_alive()?;
        Ok(self.matching(locator))
    }

    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let (locator, hook) = self.with_entry(element, |e| (e.locator.clone(), e.on_click.clone()))?;
        {
            let mut state = self.state.borrow_mut();
            state.calls.push(format!("click:{locator}"));
            state.focused = Some(element.id().to_string());
        }
        if let Some(hook) = hook {
            hook(self);
        }
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let locator = self.with_entry(element, |e| {
            e.text.push_str(text);
            e.locator.clone()
        })?;
        self.record(format!("send_keys:{locator}:{text}"));
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.with_entry(element, |e| {
            if !e.stubborn {
                e.text.clear();
            }
        })
    }

    fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        if let Some(text) = self.toast_text(element) {
            return text;
        }
        self.with_entry(element, |e| e.rendered_text())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        self.with_entry(element, |e| match name {
            "text" => Some(e.rendered_text()),
            "enabled" => Some(e.enabled.to_string()),
            "displayed" => Some(e.displayed.to_string()),
            _ => e.attributes.get(name).cloned(),
        })
    }

    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        if let Some(text) = self.toast_text(element) {
            return text.map(|_| true);
        }
        self.with_entry(element, |e| e.displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_entry(element, |e| e.enabled)
    }

    fn press_keycode(&self, code: u32) -> ProbeResult<()> {
        self.check_alive()?;
        let hooks: Vec<DeviceHook> = {
            let mut state = self.state.borrow_mut();
            state.keycodes.push(code);
            state.calls.push(format!("keycode:{code}"));
            if code == keycode::HOME {
                state.current_package = LAUNCHER_PACKAGE.to_string();
                state.current_activity = LAUNCHER_ACTIVITY.to_string();
            }
            if code == keycode::DEL {
                if let Some(focused) = state.focused.clone() {
                    if let Some(entry) = state.elements.iter_mut().find(|e| e.id == focused) {
                        entry.element.text.pop();
                    }
                }
            }
            state
                .key_hooks
                .iter()
                .filter(|(c, _)| *c == code)
                .map(|(_, hook)| hook.clone())
                .collect()
        };
        for hook in hooks {
            hook(self);
        }
        Ok(())
    }

    fn activate_app(&self, package: &str) -> ProbeResult<()> {
        self.check_alive()?;
        self.record(format!("activate:{package}"));
        self.set_current_package(package);
        Ok(())
    }

    fn terminate_app(&self, package: &str) -> ProbeResult<bool> {
        self.check_alive()?;
        self.record(format!("terminate:{package}"));
        let mut state = self.state.borrow_mut();
        if state.current_package == package {
            state.current_package = LAUNCHER_PACKAGE.to_string();
            state.current_activity = LAUNCHER_ACTIVITY.to_string();
            return Ok(true);
        }
        Ok(false)
    }

    fn current_package(&self) -> ProbeResult<String> {
        self.check_alive()?;
        Ok(self.state.borrow().current_package.clone())
    }

    fn current_activity(&self) -> ProbeResult<String> {
        self.check_alive()?;
        Ok(self.state.borrow().current_activity.clone())
    }

    fn background_app(&self, duration: Duration) -> ProbeResult<()> {
        self.check_alive()?;
        self.record(format!("background:{}", duration.as_secs()));
        Ok(())
    }

    fn swipe(&self, from: Point, to: Point, duration: Duration) -> ProbeResult<()> {
        self.check_alive()?;
        self.record(format!(
            "swipe:{},{}->{},{}:{}ms",
            from.x,
            from.y,
            to.x,
            to.y,
            duration.as_millis()
        ));
        Ok(())
    }

    fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.check_alive()?;
        Ok(FAKE_PNG.to_vec())
    }

    fn capabilities(&self) -> serde_json::Value {
        self.capabilities.clone()
    }

    fn quit(&self) -> ProbeResult<()> {
        self.check_alive()?;
        self.state.borrow_mut().quit = true;
        Ok(())
    }
}

impl DeviceSession for Rc<FakeDevice> {
    fn find_element(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        (**self).find_element(locator)
    }
    fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        (**self).find_elements(locator)
    }
    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        (**self).click(element)
    }
    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        (**self).send_keys(element, text)
    }
    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        (**self).clear(element)
    }
    fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        (**self).text(element)
    }
    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        (**self).attribute(element, name)
    }
    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        (**self).is_displayed(element)
    }
    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        (**self).is_enabled(element)
    }
    fn press_keycode(&self, code: u32) -> ProbeResult<()> {
        (**self).press_keycode(code)
    }
    fn activate_app(&self, package: &str) -> ProbeResult<()> {
        (**self).activate_app(package)
    }
    fn terminate_app(&self, package: &str) -> ProbeResult<bool> {
        (**self).terminate_app(package)
    }
    fn current_package(&self) -> ProbeResult<String> {
        (**self).current_package()
    }
    fn current_activity(&self) -> ProbeResult<String> {
        (**self).current_activity()
    }
    fn background_app(&self, duration: Duration) -> ProbeResult<()> {
        (**self).background_app(duration)
    }
    fn swipe(&self, from: Point, to: Point, duration: Duration) -> ProbeResult<()> {
        (**self).swipe(from, to, duration)
    }
    fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        (**self).screenshot()
    }
    fn capabilities(&self) -> serde_json::Value {
        (**self).capabilities()
    }
    fn quit(&self) -> ProbeResult<()> {
        (**self).quit()
    }
}

// ============================================================================
// FakeShell
// ============================================================================

struct ShellState {
    settings: HashMap<String, String>,
    packages: BTreeSet<String>,
    overrides: Vec<(String, Option<CommandOutput>)>,
    calls: Vec<String>,
}

/// Device shell with an in-memory settings table and package list
pub struct FakeShell {
    state: RefCell<ShellState>,
}

impl std::fmt::Debug for FakeShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeShell")
            .field("calls", &self.state.borrow().calls.len())
            .finish_non_exhaustive()
    }
}

impl Default for FakeShell {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeShell {
    /// Radios on, airplane mode off, nothing installed
    #[must_use]
    pub fn new() -> Self {
        let settings = [("airplane_mode_on", "0"), ("mobile_data", "1"), ("wifi_on", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            state: RefCell::new(ShellState {
                settings,
                packages: BTreeSet::new(),
                overrides: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Set a `settings get global` value
    pub fn set_setting(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .settings
            .insert(key.to_string(), value.to_string());
    }

    /// Read a `settings get global` value
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<String> {
        self.state.borrow().settings.get(key).cloned()
    }

    /// Mark a package as installed
    pub fn install(&self, package: &str) {
        self.state.borrow_mut().packages.insert(package.to_string());
    }

    /// Answer commands starting with `prefix` with a fixed output
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.state
            .borrow_mut()
            .overrides
            .push((prefix.to_string(), Some(output)));
    }

    /// Fail to start commands starting with `prefix`
    pub fn fail_to_spawn(&self, prefix: &str) {
        self.state.borrow_mut().overrides.push((prefix.to_string(), None));
    }

    /// Command lines run so far
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }
}

impl DeviceShell for FakeShell {
    fn shell(&self, args: &[&str], _timeout: Duration) -> ProbeResult<CommandOutput> {
        let line = args.join(" ");
        let mut state = self.state.borrow_mut();
        state.calls.push(line.clone());

        if let Some((_, output)) = state
            .overrides
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        {
            return output
                .clone()
                .ok_or_else(|| ProbeError::device(&line, "adb: no devices/emulators found"));
        }

        let output = match args {
            ["settings", "get", "global", key] => CommandOutput::ok(format!(
                "{}\n",
                state.settings.get(*key).map_or("null", String::as_str)
            )),
            ["svc", radio @ ("data" | "wifi"), action @ ("enable" | "disable")] => {
                let key = if *radio == "data" { "mobile_data" } else { "wifi_on" };
                let value = if *action == "enable" { "1" } else { "0" };
                state.settings.insert(key.to_string(), value.to_string());
                CommandOutput::ok("")
            }
            ["pm", "list", "packages", filter] => CommandOutput::ok(
                state
                    .packages
                    .iter()
                    .filter(|p| p.contains(*filter))
                    .map(|p| format!("package:{p}\n"))
                    .collect::<String>(),
            ),
            ["am", "force-stop", _] => CommandOutput::ok(""),
            ["killall", package] => {
                CommandOutput::failed(1, format!("killall: {package}: no process killed"))
            }
            _ => CommandOutput::failed(127, format!("{line}: not found")),
        };
        Ok(output)
    }
}

// ============================================================================
// FakeSessionFactory
// ============================================================================

/// Session factory building a fresh fake device and shell per scenario
pub struct FakeSessionFactory {
    build: Box<dyn Fn(AppLaunch) -> (Rc<FakeDevice>, Rc<FakeShell>)>,
    opened: RefCell<Vec<Rc<FakeDevice>>>,
}

impl std::fmt::Debug for FakeSessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSessionFactory")
            .field("opened", &self.opened.borrow().len())
            .finish_non_exhaustive()
    }
}

impl FakeSessionFactory {
    /// Factory calling `build` for every session
    #[must_use]
    pub fn new(build: impl Fn(AppLaunch) -> (Rc<FakeDevice>, Rc<FakeShell>) + 'static) -> Self {
        Self {
            build: Box::new(build),
            opened: RefCell::new(Vec::new()),
        }
    }

    /// Every device handed out so far
    #[must_use]
    pub fn opened(&self) -> Vec<Rc<FakeDevice>> {
        self.opened.borrow().clone()
    }
}

impl DeviceShell for Rc<FakeShell> {
    fn shell(&self, args: &[&str], timeout: Duration) -> ProbeResult<CommandOutput> {
        (**self).shell(args, timeout)
    }
}

impl SessionFactory for FakeSessionFactory {
    fn open(&self, launch: AppLaunch) -> ProbeResult<OpenedSession> {
        let (device, shell) = (self.build)(launch);
        self.opened.borrow_mut().push(device.clone());
        Ok(OpenedSession {
            session: Box::new(device),
            shell: Box::new(shell),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const FIELD: Locator = Locator::xpath("(//android.widget.EditText)[1]");

    #[test]
    fn test_click_runs_hook_and_logs() {
        let device = FakeDevice::new();
        device.add(FakeElement::new(FIELD).on_click(|d| d.set_current_activity(".Next")));
        let element = device.find_element(&FIELD).unwrap();
        device.click(&element).unwrap();
        assert_eq!(device.clicks(&FIELD), 1);
        assert_eq!(device.current_activity().unwrap(), ".Next");
    }

    #[test]
    fn test_removed_element_goes_stale() {
        let device = FakeDevice::new();
        let element = device.add(FakeElement::new(FIELD));
        device.remove(&FIELD);
        assert!(device.is_displayed(&element).unwrap_err().is_missing_element());
    }

    #[test]
    fn test_home_moves_to_launcher() {
        let device = FakeDevice::new();
        device.activate_app("net.bucketplace").unwrap();
        device.press_keycode(keycode::HOME).unwrap();
        assert_eq!(device.current_package().unwrap(), LAUNCHER_PACKAGE);
    }

    #[test]
    fn test_stubborn_field_needs_backspace() {
        let device = FakeDevice::new();
        let element = device.add(FakeElement::new(FIELD).with_text("ab").stubborn());
        device.click(&element).unwrap();
        device.clear(&element).unwrap();
        assert_eq!(device.text(&element).unwrap(), "ab");
        device.press_keycode(keycode::DEL).unwrap();
        assert_eq!(device.text(&element).unwrap(), "a");
    }

    #[test]
    fn test_quit_invalidates_session() {
        let device = FakeDevice::new();
        device.quit().unwrap();
        assert!(device.is_quit());
        assert!(device.current_package().is_err());
        assert_eq!(device.foreground_package(), LAUNCHER_PACKAGE);
    }

    #[test]
    fn test_shell_radio_model() {
        let shell = FakeShell::new();
        shell.shell(&["svc", "data", "disable"], Duration::ZERO).unwrap();
        let out = shell
            .shell(&["settings", "get", "global", "mobile_data"], Duration::ZERO)
            .unwrap();
        assert_eq!(out.stdout_trimmed(), "0");
    }

    #[test]
    fn test_shell_overrides_win() {
        let shell = FakeShell::new();
        shell.respond("svc wifi", CommandOutput::failed(255, "permission denied"));
        let out = shell.shell(&["svc", "wifi", "disable"], Duration::ZERO).unwrap();
        assert!(!out.success());
        shell.fail_to_spawn("pm");
        assert!(shell.shell(&["pm", "list", "packages", "x"], Duration::ZERO).is_err());
    }
}
