// crates/blockdrag-webdriver/tests/webdriver_session.rs
// ============================================================================
// Module: WebDriver Session Tests
// Description: WebDriverSession against a scripted tiny_http driver.
// Purpose: Verify command shapes, pointer interpolation, and error mapping.
// ============================================================================

//! ## Overview
//! The stub driver answers every command through a routing closure and
//! records the method, path, and body it received.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use blockdrag_core::BoundingBox;
use blockdrag_core::BrowserError;
use blockdrag_core::BrowserSession;
use blockdrag_core::NetworkProfile;
use blockdrag_core::Point;
use blockdrag_core::Selector;
use blockdrag_webdriver::ELEMENT_KEY;
use blockdrag_webdriver::WebDriverConfig;
use blockdrag_webdriver::WebDriverSession;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Driver
// ============================================================================

type Route = dyn Fn(&str, &str, &Value) -> (u16, Value) + Send + Sync;

struct StubDriver {
    url: String,
    server: Arc<Server>,
    seen: Arc<Mutex<Vec<(String, String, Value)>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubDriver {
    fn start(route: Box<Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let server = Arc::clone(&server);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut content = String::new();
                    let _ = request.as_reader().read_to_string(&mut content);
                    let body = serde_json::from_str(&content).unwrap_or(Value::Null);
                    let method = request.method().to_string();
                    let url = request.url().to_string();
                    let (status, reply) = route(&method, &url, &body);
                    seen.lock().unwrap().push((method, url, body));
                    let header =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(reply.to_string())
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            url: format!("http://{addr}"),
            server,
            seen,
            handle: Some(handle),
        }
    }

    fn seen(&self) -> Vec<(String, String, Value)> {
        self.seen.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.seen().into_iter().map(|(method, path, _)| format!("{method} {path}")).collect()
    }

    fn bodies_for(&self, suffix: &str) -> Vec<Value> {
        self.seen()
            .into_iter()
            .filter(|(_, path, _)| path.ends_with(suffix))
            .map(|(_, _, body)| body)
            .collect()
    }
}

impl Drop for StubDriver {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn ok(value: Value) -> (u16, Value) {
    (200, json!({ "value": value }))
}

fn w3c_error(status: u16, code: &str) -> (u16, Value) {
    (status, json!({ "value": { "error": code, "message": "stub", "stacktrace": "" } }))
}

/// Routes a small fake page: `#row` exists with a box, `#flat` has no size,
/// everything else is absent.
fn page_route(method: &str, path: &str, body: &Value) -> (u16, Value) {
    let tail = path.trim_start_matches("/session/s-1");
    match (method, tail) {
        ("POST", "/session") => ok(json!({ "sessionId": "s-1", "capabilities": {} })),
        ("POST", "/element") => match body["value"].as_str() {
            Some("#row") => ok(json!({ ELEMENT_KEY: "e-row" })),
            Some("#flat") => ok(json!({ ELEMENT_KEY: "e-flat" })),
            Some("input") => ok(json!({ ELEMENT_KEY: "e-input" })),
            _ => w3c_error(404, "no such element"),
        },
        ("POST", "/elements") => ok(json!([{ ELEMENT_KEY: "e-1" }, { ELEMENT_KEY: "e-2" }])),
        ("GET", "/element/e-1/text") => ok(json!("first")),
        ("GET", "/element/e-2/text") => ok(json!("second")),
        ("GET", "/element/e-input/property/value") => ok(Value::Null),
        ("GET", "/element/e-row/property/value") => ok(json!("Pear C")),
        ("GET", "/element/e-row/displayed") => ok(json!(true)),
        ("POST", "/execute/sync") => {
            if body["args"][0][ELEMENT_KEY] == json!("e-flat") {
                ok(json!({ "x": 10.0, "y": 10.0, "width": 0.0, "height": 0.0 }))
            } else {
                ok(json!({ "x": 40.0, "y": 100.0, "width": 600.0, "height": 80.0 }))
            }
        }
        ("GET", "/url") => ok(json!("http://cms.test/admin")),
        ("POST", "/goog/cdp/execute") => ok(json!({})),
        ("POST", "/execute/async") => w3c_error(500, "javascript error"),
        _ => ok(Value::Null),
    }
}

async fn connect(driver: &StubDriver) -> WebDriverSession {
    WebDriverSession::connect(&WebDriverConfig::new(&driver.url)).await.unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn connect_sends_window_and_headless_capabilities() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    assert_eq!(session.session_id(), "s-1");
    let created = &driver.bodies_for("/session")[0];
    let args = &created["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
    assert_eq!(args, &json!(["--window-size=1270,960", "--headless=new"]));
}

#[test]
fn headed_sessions_omit_headless_flag() {
    let config = WebDriverConfig {
        headless: false,
        ..WebDriverConfig::new("http://unused")
    };
    let args = &config.capabilities()["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
    assert_eq!(args, &json!(["--window-size=1270,960"]));
}

#[tokio::test]
async fn missing_elements_read_as_absent() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;
    let missing = Selector::css("#missing");

    assert_eq!(session.bounding_box(&missing).await.unwrap(), None);
    assert!(!session.is_visible(&missing).await.unwrap());
    assert_eq!(session.input_value(&missing).await.unwrap(), None);
    let err = session.click(&missing).await.unwrap_err();
    assert!(matches!(err, BrowserError::NotFound(selector) if selector == missing));
}

#[tokio::test]
async fn bounding_boxes_use_client_rect_and_skip_zero_size() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    let rect = session.bounding_box(&Selector::css("#row")).await.unwrap();
    assert_eq!(rect, Some(BoundingBox {
        x: 40.0,
        y: 100.0,
        width: 600.0,
        height: 80.0,
    }));
    assert_eq!(session.bounding_box(&Selector::css("#flat")).await.unwrap(), None);
    assert!(session.is_visible(&Selector::css("#row")).await.unwrap());
}

#[tokio::test]
async fn xpath_selectors_use_xpath_strategy() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.is_visible(&Selector::xpath("//button[text()='Show All']")).await.unwrap();

    let lookup = &driver.bodies_for("/element")[0];
    assert_eq!(lookup["using"], json!("xpath"));
}

#[tokio::test]
async fn pointer_moves_interpolate_from_hover_point() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.hover(&Selector::css("#row")).await.unwrap();
    session.pointer_down().await.unwrap();
    session.pointer_move(Point::new(340.0, 300.0), 2).await.unwrap();
    session.pointer_up().await.unwrap();

    let actions = driver.bodies_for("/actions");
    assert_eq!(actions.len(), 4);
    let hover = &actions[0]["actions"][0]["actions"][0];
    assert_eq!((hover["x"].as_f64(), hover["y"].as_f64()), (Some(340.0), Some(140.0)));
    assert_eq!(actions[1]["actions"][0]["actions"][0]["type"], json!("pointerDown"));
    let moves = actions[2]["actions"][0]["actions"].as_array().unwrap();
    let points: Vec<_> =
        moves.iter().map(|step| (step["x"].as_f64().unwrap(), step["y"].as_f64().unwrap())).collect();
    assert_eq!(points, [(340.0, 220.0), (340.0, 300.0)]);
    assert_eq!(actions[3]["actions"][0]["actions"][0]["type"], json!("pointerUp"));
    assert!(actions.iter().all(|body| body["actions"][0]["id"] == json!("mouse")));
}

#[tokio::test]
async fn reads_values_and_texts() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    assert_eq!(session.input_value(&Selector::css("#row")).await.unwrap().as_deref(), Some("Pear C"));
    assert_eq!(session.input_value(&Selector::css("input")).await.unwrap(), None);
    let texts = session.all_inner_texts(&Selector::css(".label")).await.unwrap();
    assert_eq!(texts, ["first", "second"]);
    assert_eq!(session.current_url().await.unwrap(), "http://cms.test/admin");
}

#[tokio::test]
async fn fill_clears_before_typing() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.fill(&Selector::css("input"), "user@example.com").await.unwrap();

    let paths = driver.paths();
    let clear = paths.iter().position(|path| path.ends_with("/element/e-input/clear")).unwrap();
    let value = paths.iter().position(|path| path.ends_with("/element/e-input/value")).unwrap();
    assert!(clear < value);
    assert_eq!(driver.bodies_for("/element/e-input/value")[0], json!({ "text": "user@example.com" }));
}

#[tokio::test]
async fn network_profile_goes_through_cdp_passthrough() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.emulate_network(&NetworkProfile::cellular_3g()).await.unwrap();

    let body = &driver.bodies_for("/goog/cdp/execute")[0];
    assert_eq!(body["cmd"], json!("Network.emulateNetworkConditions"));
    assert_eq!(body["params"]["downloadThroughput"], json!(96_000));
    assert_eq!(body["params"]["uploadThroughput"], json!(32_000));
    assert_eq!(body["params"]["latency"], json!(100));
    assert_eq!(body["params"]["connectionType"], json!("cellular3g"));
}

#[tokio::test]
async fn close_deletes_session_once() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.close().await.unwrap();
    session.close().await.unwrap();

    let deletes: Vec<_> = driver.paths().into_iter().filter(|path| path.starts_with("DELETE")).collect();
    assert_eq!(deletes, ["DELETE /session/s-1"]);
}

#[tokio::test]
async fn transcript_records_commands_and_failures() {
    let driver = StubDriver::start(Box::new(page_route));
    let session = connect(&driver).await;

    session.bounding_box(&Selector::css("#missing")).await.unwrap();

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sequence, 1);
    assert_eq!(entries[0].path, "session");
    assert_eq!(entries[1].method, "POST");
    assert_eq!(entries[1].path, "element");
    assert_eq!(entries[1].request["value"], json!("#missing"));
    assert!(entries[1].error.as_deref().unwrap().starts_with("no such element"));
}

#[tokio::test]
async fn unknown_driver_errors_are_protocol_errors() {
    let driver = StubDriver::start(Box::new(|method: &str, path: &str, body: &Value| {
        if path.ends_with("/url") && method == "POST" {
            return w3c_error(500, "unknown error");
        }
        page_route(method, path, body)
    }));
    let session = connect(&driver).await;

    let err = session.goto("http://cms.test/admin").await.unwrap_err();
    assert!(matches!(err, BrowserError::Protocol(message) if message.starts_with("unknown error")));
}

#[tokio::test]
async fn off_screen_moves_are_out_of_bounds_errors() {
    let driver = StubDriver::start(Box::new(|method: &str, path: &str, body: &Value| {
        if path.ends_with("/actions") && method == "POST" {
            return w3c_error(400, "move target out of bounds");
        }
        page_route(method, path, body)
    }));
    let session = connect(&driver).await;

    let err = session.pointer_move(Point::new(340.0, 5000.0), 1).await.unwrap_err();
    assert!(matches!(err, BrowserError::OutOfBounds(message) if message == "stub"));
}

#[tokio::test]
async fn unreachable_driver_is_transport_error() {
    let config = WebDriverConfig {
        timeout: std::time::Duration::from_millis(500),
        ..WebDriverConfig::new("http://127.0.0.1:9")
    };
    let err = WebDriverSession::connect(&config).await.err().unwrap();
    assert!(matches!(err, BrowserError::Transport(_) | BrowserError::Timeout(_)));
}
