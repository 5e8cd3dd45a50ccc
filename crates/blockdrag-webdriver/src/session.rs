// crates/blockdrag-webdriver/src/session.rs
// ============================================================================
// Module: WebDriver Session
// Description: BrowserSession over the W3C WebDriver HTTP protocol.
// Purpose: Drive a real browser for the harness with a full transcript.
// Dependencies: blockdrag-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`WebDriverSession`] speaks plain W3C WebDriver to a driver such as
//! chromedriver. Pointer primitives share one persistent `mouse` input
//! source, so a press in one `actions` call is still held in the next. The
//! session tracks the last pointer position itself and interpolates
//! intermediate moves from it. Network emulation uses the Chromium DevTools
//! passthrough and therefore requires a Chromium-based browser.
//!
//! Invariants:
//! - Every command is recorded in the [`Transcript`], failures included.
//! - "no such element" and "stale element reference" read as absent.
//! - Zero-size boxes read as not rendered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use blockdrag_core::BoundingBox;
use blockdrag_core::BrowserError;
use blockdrag_core::BrowserSession;
use blockdrag_core::NetworkProfile;
use blockdrag_core::Point;
use blockdrag_core::Selector;
use reqwest::Client;
use reqwest::Method;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::trace;

use crate::transcript::Transcript;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// W3C web element reference key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// Default driver request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Id of the persistent pointer input source.
const POINTER_ID: &str = "mouse";
/// Reads an element's bounding box in viewport coordinates.
const BOUNDING_BOX_SCRIPT: &str = "const r = arguments[0].getBoundingClientRect(); \
     return { x: r.x, y: r.y, width: r.width, height: r.height };";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Driver connection and browser window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverConfig {
    /// Driver root, for example `http://localhost:9515`.
    pub url: String,
    /// Run the browser without a window.
    pub headless: bool,
    /// Window width in pixels.
    pub viewport_width: u32,
    /// Window height in pixels. Every row the harness drags onto must fit
    /// inside it; releases below the fold fail as geometry faults.
    pub viewport_height: u32,
    /// Per-command timeout.
    pub timeout: Duration,
}

impl WebDriverConfig {
    /// Creates a headless 1270x960 configuration for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headless: true,
            viewport_width: 1270,
            viewport_height: 960,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Returns the new-session capabilities payload.
    #[must_use]
    pub fn capabilities(&self) -> Value {
        let mut args = vec![format!("--window-size={},{}", self.viewport_width, self.viewport_height)];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Browsing session backed by a WebDriver server.
pub struct WebDriverSession {
    /// HTTP client.
    client: Client,
    /// Driver root.
    driver: Url,
    /// Session root, `{driver}/session/{id}/`.
    root: Url,
    /// Session id assigned by the driver.
    session_id: String,
    /// Command transcript.
    transcript: Transcript,
    /// Last pointer position in viewport coordinates.
    pointer: Mutex<Point>,
    /// Set once the session was deleted.
    closed: AtomicBool,
}

impl WebDriverSession {
    /// Starts a new browser session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver is unreachable or refuses the
    /// capabilities.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, BrowserError> {
        Self::connect_with_transcript(config, Transcript::new()).await
    }

    /// Starts a new browser session recording into `transcript`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver is unreachable or refuses the
    /// capabilities.
    pub async fn connect_with_transcript(
        config: &WebDriverConfig,
        transcript: Transcript,
    ) -> Result<Self, BrowserError> {
        let mut driver = Url::parse(&config.url)
            .map_err(|err| BrowserError::Transport(format!("invalid webdriver url: {err}")))?;
        if !driver.path().ends_with('/') {
            let path = format!("{}/", driver.path());
            driver.set_path(&path);
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BrowserError::Transport(format!("http client build failed: {err}")))?;
        let created =
            send(&client, &transcript, &driver, Method::POST, "session", Some(config.capabilities()))
                .await?;
        let session_id = created
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Protocol("new session reply lacks sessionId".to_string()))?
            .to_string();
        let root = driver
            .join(&format!("session/{session_id}/"))
            .map_err(|err| BrowserError::Protocol(format!("invalid session id: {err}")))?;
        debug!(session_id = %session_id, "webdriver session started");
        Ok(Self {
            client,
            driver,
            root,
            session_id,
            transcript,
            pointer: Mutex::new(Point::new(0.0, 0.0)),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the driver-assigned session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the command transcript.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Issues a session command and returns the reply's `value`.
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        send(&self.client, &self.transcript, &self.root, method, path, body).await
    }

    /// Finds the first element matching `selector`.
    async fn find(&self, selector: &Selector) -> Result<Option<String>, BrowserError> {
        match self.command(Method::POST, "element", Some(locator(selector))).await {
            Ok(value) => element_id(&value).map(Some),
            Err(BrowserError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Finds every element matching `selector`, in document order.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<String>, BrowserError> {
        let value = self.command(Method::POST, "elements", Some(locator(selector))).await?;
        let items = value
            .as_array()
            .ok_or_else(|| BrowserError::Protocol("find elements reply is not a list".to_string()))?;
        items.iter().map(element_id).collect()
    }

    /// Finds the first match or fails with [`BrowserError::NotFound`].
    async fn require(&self, selector: &Selector) -> Result<String, BrowserError> {
        self.find(selector).await?.ok_or_else(|| BrowserError::NotFound(selector.clone()))
    }

    /// Issues an element command, mapping absence to `selector`.
    async fn element_command(
        &self,
        selector: &Selector,
        element: &str,
        method: Method,
        command: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        self.command(method, &format!("element/{element}/{command}"), body)
            .await
            .map_err(|err| match err {
                BrowserError::NotFound(_) => BrowserError::NotFound(selector.clone()),
                other => other,
            })
    }

    /// Reads the bounding box of a known element.
    async fn element_box(&self, element: &str) -> Result<Option<BoundingBox>, BrowserError> {
        let body = json!({
            "script": BOUNDING_BOX_SCRIPT,
            "args": [{ ELEMENT_KEY: element }],
        });
        let value = match self.command(Method::POST, "execute/sync", Some(body)).await {
            Ok(value) => value,
            Err(BrowserError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        let rect: BoundingBox = serde_json::from_value(value)
            .map_err(|err| BrowserError::Protocol(format!("invalid bounding box: {err}")))?;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(None);
        }
        Ok(Some(rect))
    }

    /// Performs one pointer action sequence.
    async fn pointer_actions(&self, actions: Vec<Value>) -> Result<(), BrowserError> {
        let body = json!({
            "actions": [{
                "type": "pointer",
                "id": POINTER_ID,
                "parameters": { "pointerType": "mouse" },
                "actions": actions,
            }]
        });
        self.command(Method::POST, "actions", Some(body)).await.map(|_| ())
    }

    /// Returns the last known pointer position.
    fn pointer_position(&self) -> Point {
        self.pointer.lock().map_or(Point::new(0.0, 0.0), |point| *point)
    }

    /// Records the pointer position.
    fn set_pointer_position(&self, point: Point) {
        if let Ok(mut guard) = self.pointer.lock() {
            *guard = point;
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, "url", Some(json!({ "url": url }))).await.map(|_| ())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        let value = self.command(Method::GET, "url", None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Protocol("current url is not a string".to_string()))
    }

    async fn click(&self, selector: &Selector) -> Result<(), BrowserError> {
        let element = self.require(selector).await?;
        self.element_command(selector, &element, Method::POST, "click", Some(json!({})))
            .await
            .map(|_| ())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), BrowserError> {
        let element = self.require(selector).await?;
        self.element_command(selector, &element, Method::POST, "clear", Some(json!({}))).await?;
        self.element_command(selector, &element, Method::POST, "value", Some(json!({ "text": value })))
            .await
            .map(|_| ())
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool, BrowserError> {
        let Some(element) = self.find(selector).await? else {
            return Ok(false);
        };
        match self.element_command(selector, &element, Method::GET, "displayed", None).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(BrowserError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn bounding_box(
        &self,
        selector: &Selector,
    ) -> Result<Option<BoundingBox>, BrowserError> {
        match self.find(selector).await? {
            Some(element) => self.element_box(&element).await,
            None => Ok(None),
        }
    }

    async fn hover(&self, selector: &Selector) -> Result<(), BrowserError> {
        let element = self.require(selector).await?;
        let rect =
            self.element_box(&element).await?.ok_or_else(|| BrowserError::NotFound(selector.clone()))?;
        let center = rect.center();
        self.pointer_actions(vec![move_to(center)]).await?;
        self.set_pointer_position(center);
        Ok(())
    }

    async fn pointer_down(&self) -> Result<(), BrowserError> {
        self.pointer_actions(vec![json!({ "type": "pointerDown", "button": 0 })]).await
    }

    async fn pointer_move(&self, to: Point, steps: u32) -> Result<(), BrowserError> {
        let from = self.pointer_position();
        let steps = steps.max(1);
        let actions = (1 ..= steps)
            .map(|step| {
                let t = f64::from(step) / f64::from(steps);
                move_to(Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t))
            })
            .collect();
        self.pointer_actions(actions).await?;
        self.set_pointer_position(to);
        Ok(())
    }

    async fn pointer_up(&self) -> Result<(), BrowserError> {
        self.pointer_actions(vec![json!({ "type": "pointerUp", "button": 0 })]).await
    }

    async fn input_value(&self, selector: &Selector) -> Result<Option<String>, BrowserError> {
        let Some(element) = self.find(selector).await? else {
            return Ok(None);
        };
        match self.element_command(selector, &element, Method::GET, "property/value", None).await {
            Ok(value) => Ok(value.as_str().map(str::to_string)),
            Err(BrowserError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn all_inner_texts(&self, selector: &Selector) -> Result<Vec<String>, BrowserError> {
        let mut texts = Vec::new();
        for element in self.find_all(selector).await? {
            let value = self.element_command(selector, &element, Method::GET, "text", None).await?;
            texts.push(value.as_str().unwrap_or_default().to_string());
        }
        Ok(texts)
    }

    async fn emulate_network(&self, profile: &NetworkProfile) -> Result<(), BrowserError> {
        let body = json!({
            "cmd": "Network.emulateNetworkConditions",
            "params": {
                "offline": profile.offline,
                "latency": profile.latency_ms,
                "downloadThroughput": profile.download_throughput,
                "uploadThroughput": profile.upload_throughput,
                "connectionType": profile.connection_type,
            }
        });
        self.command(Method::POST, "goog/cdp/execute", Some(body)).await.map(|_| ())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let path = format!("session/{}", self.session_id);
        send(&self.client, &self.transcript, &self.driver, Method::DELETE, &path, None).await?;
        debug!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}

// ============================================================================
// SECTION: Protocol Helpers
// ============================================================================

/// Sends one command, records it, and unwraps the W3C `value` envelope.
async fn send(
    client: &Client,
    transcript: &Transcript,
    base: &Url,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, BrowserError> {
    let method_label = method.to_string();
    let request_value = body.clone().unwrap_or(Value::Null);
    let outcome = exchange(client, base, method, path, body).await;
    match &outcome {
        Ok((_, reply)) => {
            let error = protocol_error(reply).map(|(code, message)| format!("{code}: {message}"));
            transcript.record(&method_label, path, request_value, reply.clone(), error);
        }
        Err(err) => transcript.record(&method_label, path, request_value, Value::Null, Some(err.to_string())),
    }
    let (status, reply) = outcome?;
    if let Some((code, message)) = protocol_error(&reply) {
        return Err(classify(&code, &message));
    }
    if !status.is_success() {
        return Err(BrowserError::Protocol(format!("{method_label} {path} returned {status}")));
    }
    Ok(reply.get("value").cloned().unwrap_or(Value::Null))
}

/// Performs the HTTP exchange and decodes the JSON reply.
async fn exchange(
    client: &Client,
    base: &Url,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<(reqwest::StatusCode, Value), BrowserError> {
    let url = base
        .join(path)
        .map_err(|err| BrowserError::Transport(format!("invalid command path {path}: {err}")))?;
    trace!(method = %method, url = %url, "webdriver command");
    let mut request = client.request(method, url);
    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body)
            .map_err(|err| BrowserError::Protocol(format!("request encoding failed: {err}")))?;
        request = request.header(CONTENT_TYPE, "application/json; charset=utf-8").body(bytes);
    }
    let response = request.send().await.map_err(|err| {
        if err.is_timeout() {
            BrowserError::Timeout(format!("{path}: {err}"))
        } else {
            BrowserError::Transport(format!("{path}: {err}"))
        }
    })?;
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| BrowserError::Transport(format!("{path}: failed to read reply: {err}")))?;
    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }
    let reply = serde_json::from_slice(&bytes)
        .map_err(|err| BrowserError::Protocol(format!("{path}: invalid reply: {err}")))?;
    Ok((status, reply))
}

/// Extracts a W3C error code and message from a reply.
fn protocol_error(reply: &Value) -> Option<(String, String)> {
    let value = reply.get("value")?;
    let code = value.get("error")?.as_str()?;
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();
    Some((code.to_string(), message.to_string()))
}

/// Maps a W3C error code to a [`BrowserError`].
fn classify(code: &str, message: &str) -> BrowserError {
    match code {
        "no such element" | "stale element reference" => {
            BrowserError::NotFound(Selector::css(message.to_string()))
        }
        "timeout" | "script timeout" => BrowserError::Timeout(message.to_string()),
        "move target out of bounds" => BrowserError::OutOfBounds(message.to_string()),
        _ => BrowserError::Protocol(format!("{code}: {message}")),
    }
}

/// Builds a locator payload.
fn locator(selector: &Selector) -> Value {
    match selector {
        Selector::Css(value) => json!({ "using": "css selector", "value": value }),
        Selector::XPath(value) => json!({ "using": "xpath", "value": value }),
    }
}

/// Extracts an element id from a web element reference.
fn element_id(value: &Value) -> Result<String, BrowserError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BrowserError::Protocol("reply lacks a web element reference".to_string()))
}

/// Builds a viewport-origin pointer move.
fn move_to(point: Point) -> Value {
    json!({
        "type": "pointerMove",
        "duration": 0,
        "origin": "viewport",
        "x": point.x.round(),
        "y": point.y.round(),
    })
}
