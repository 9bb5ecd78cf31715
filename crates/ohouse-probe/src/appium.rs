//! Appium client over the W3C WebDriver HTTP protocol.
//!
//! Only what [`DeviceSession`] needs: element lookup and interaction, key
//! events, app lifecycle and a pointer swipe. Calls block until the server
//! answers; the HTTP timeout is the only bound on a single call.

use crate::config::{AppConfig, AppLaunch};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{DeviceSession, ElementHandle, Point};
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// W3C web element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSONWP element key some drivers still send
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Per-request HTTP timeout; session creation installs the UiAutomator2 server
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(180);

/// Live Appium session
#[derive(Debug)]
pub struct AppiumSession {
    base_url: String,
    session_id: String,
    client: Client,
    capabilities: Value,
}

impl AppiumSession {
    /// Open a session for `config`
    pub fn open(config: &AppConfig, launch: AppLaunch) -> ProbeResult<Self> {
        Self::create(&config.appium_server_url, config.capabilities(launch))
    }

    /// Open a session with explicit capabilities
    pub fn create(base_url: &str, capabilities: Map<String, Value>) -> ProbeResult<Self> {
        let client = Client::builder().timeout(DEFAULT_HTTP_TIMEOUT).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        tracing::info!(server = %base_url, "creating Appium session");
        let value = send(
            client
                .post(format!("{base_url}/session"))
                .json(&new_session_body(capabilities)),
        )?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::UnexpectedResponse {
                message: format!("no sessionId in {value}"),
            })?
            .to_string();
        let capabilities = value.get("capabilities").cloned().unwrap_or(Value::Null);
        tracing::info!(session_id = %session_id, "Appium session ready");

        let session = Self {
            base_url,
            session_id,
            client,
            capabilities,
        };
        // every wait is driven by the poller
        if let Err(e) = session.post("timeouts", &json!({ "implicit": 0 })) {
            if let Err(cleanup) = session.quit() {
                tracing::warn!(session_id = %session.session_id, error = %cleanup, "session left open");
            }
            return Err(e);
        }
        Ok(session)
    }

    /// Server-side session id
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{path}", self.base_url, self.session_id)
        }
    }

    fn get(&self, path: &str) -> ProbeResult<Value> {
        send(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str, body: &Value) -> ProbeResult<Value> {
        send(self.client.post(self.url(path)).json(body))
    }

    fn element_get(&self, element: &ElementHandle, suffix: &str) -> ProbeResult<Value> {
        self.get(&format!("element/{}/{suffix}", element.id()))
    }

    fn element_post(&self, element: &ElementHandle, suffix: &str, body: &Value) -> ProbeResult<Value> {
        self.post(&format!("element/{}/{suffix}", element.id()), body)
    }
}

/// Body of `POST /session`
#[must_use]
pub fn new_session_body(capabilities: Map<String, Value>) -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": capabilities,
            "firstMatch": [{}],
        }
    })
}

/// Body of a find request
#[must_use]
pub fn find_body(locator: &Locator) -> Value {
    json!({
        "using": locator.strategy().as_w3c(),
        "value": locator.expression(),
    })
}

/// W3C pointer actions for a one-finger swipe
#[must_use]
pub fn swipe_actions(from: Point, to: Point, duration: Duration) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": { "pointerType": "touch" },
            "actions": [
                { "type": "pointerMove", "duration": 0, "x": from.x, "y": from.y },
                { "type": "pointerDown", "button": 0 },
                { "type": "pause", "duration": 100 },
                {
                    "type": "pointerMove",
                    "duration": duration.as_millis() as u64,
                    "origin": "viewport",
                    "x": to.x,
                    "y": to.y,
                },
                { "type": "pointerUp", "button": 0 },
            ],
        }]
    })
}

/// Element reference inside a find response
pub fn parse_element(value: &Value) -> ProbeResult<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementHandle::new)
        .ok_or_else(|| ProbeError::UnexpectedResponse {
            message: format!("no element reference in {value}"),
        })
}

/// Split a W3C response into its `value` or a typed error
pub fn unwrap_response(status: u16, body: Value) -> ProbeResult<Value> {
    let value = match body {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => other,
    };
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(ProbeError::Protocol {
            error: error.to_string(),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }
    if !(200..300).contains(&status) {
        return Err(ProbeError::UnexpectedResponse {
            message: format!("HTTP {status}: {value}"),
        });
    }
    Ok(value)
}

fn send(request: RequestBuilder) -> ProbeResult<Value> {
    let response = request.send()?;
    let status = response.status().as_u16();
    let text = response.text()?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)?
    };
    unwrap_response(status, body)
}

fn expect_str(value: Value, what: &str) -> ProbeResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ProbeError::UnexpectedResponse {
            message: format!("{what}: expected string, got {other}"),
        }),
    }
}

fn expect_bool(value: &Value, what: &str) -> ProbeResult<bool> {
    value.as_bool().ok_or_else(|| ProbeError::UnexpectedResponse {
        message: format!("{what}: expected bool, got {value}"),
    })
}

impl DeviceSession for AppiumSession {
    fn find_element(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        let value = self.post("element", &find_body(locator))?;
        parse_element(&value)
    }

    fn find_elements(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        match self.post("elements", &find_body(locator))? {
            Value::Array(items) => items.iter().map(parse_element).collect(),
            other => Err(ProbeError::UnexpectedResponse {
                message: format!("elements: expected array, got {other}"),
            }),
        }
    }

    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.element_post(element, "click", &json!({}))?;
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.element_post(element, "value", &json!({ "text": text }))?;
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.element_post(element, "clear", &json!({}))?;
        Ok(())
    }

    fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        expect_str(self.element_get(element, "text")?, "text")
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        match self.element_get(element, &format!("attribute/{name}"))? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        expect_bool(&self.element_get(element, "displayed")?, "displayed")
    }

    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        expect_bool(&self.element_get(element, "enabled")?, "enabled")
    }

    fn press_keycode(&self, keycode: u32) -> ProbeResult<()> {
        self.post("appium/device/press_keycode", &json!({ "keycode": keycode }))?;
        Ok(())
    }

    fn activate_app(&self, package: &str) -> ProbeResult<()> {
        self.post("appium/device/activate_app", &json!({ "appId": package }))?;
        Ok(())
    }

    fn terminate_app(&self, package: &str) -> ProbeResult<bool> {
        let value = self.post("appium/device/terminate_app", &json!({ "appId": package }))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn current_package(&self) -> ProbeResult<String> {
        expect_str(self.get("appium/device/current_package")?, "current_package")
    }

    fn current_activity(&self) -> ProbeResult<String> {
        expect_str(self.get("appium/device/current_activity")?, "current_activity")
    }

    fn background_app(&self, duration: Duration) -> ProbeResult<()> {
        self.post("appium/app/background", &json!({ "seconds": duration.as_secs() }))?;
        Ok(())
    }

    fn swipe(&self, from: Point, to: Point, duration: Duration) -> ProbeResult<()> {
        self.post("actions", &swipe_actions(from, to, duration))?;
        Ok(())
    }

    fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        let encoded = expect_str(self.get("screenshot")?, "screenshot")?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ProbeError::UnexpectedResponse {
                message: format!("screenshot is not base64: {e}"),
            })
    }

    fn capabilities(&self) -> Value {
        self.capabilities.clone()
    }

    fn quit(&self) -> ProbeResult<()> {
        tracing::info!(session_id = %self.session_id, "deleting Appium session");
        send(self.client.delete(self.url("")))?;
        Ok(())
    }
}
