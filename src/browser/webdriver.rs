//! W3C WebDriver client.
//!
//! Speaks the JSON wire format of the WebDriver specification to a driver
//! binary such as chromedriver. Installing and launching that binary is left
//! to the environment; the harness only needs its endpoint.

use std::time::Duration;

use base64::Engine;
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use serde_json::{Value, json};

use super::{BrowserError, BrowserResult, BrowserSession, ElementRef, Locator, SessionFactory};

/// Key the protocol uses to mark element references in JSON
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// HTTP timeout for a single WebDriver command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Chrome arguments applied to every session
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
    "--window-size=1920,1080",
];

/// Opens Chrome sessions through a WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    endpoint: String,
    headless: bool,
    client: Client,
}

impl WebDriverFactory {
    pub fn new(endpoint: impl Into<String>, headless: bool) -> BrowserResult<Self> {
        let client = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(|e| BrowserError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            headless,
            client,
        })
    }

    /// New-session capabilities payload.
    ///
    /// Prompts are left open for the harness to handle. The protocol default
    /// dismisses any dialog the next command runs into.
    fn capabilities(&self) -> Value {
        let mut args: Vec<&str> = CHROME_ARGS.to_vec();
        if self.headless {
            args.push("--headless=new");
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "unhandledPromptBehavior": "ignore",
                    "goog:chromeOptions": {
                        "args": args,
                        "excludeSwitches": ["enable-automation"],
                    },
                }
            }
        })
    }
}

impl SessionFactory for WebDriverFactory {
    fn open(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        let url = format!("{}/session", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&self.capabilities())
            .send()
            .map_err(|e| BrowserError::SessionNotCreated(format!("{}: {}", url, e)))?;
        let value = parse_response(response)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BrowserError::SessionNotCreated("response carried no sessionId".to_string())
            })?
            .to_string();

        tracing::debug!("Opened WebDriver session {}", session_id);
        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            session_id,
            closed: false,
        }))
    }

    fn kind(&self) -> &str {
        "webdriver"
    }
}

/// One live WebDriver session
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    fn command(&self, method: Method, path: &str, body: Option<Value>) -> BrowserResult<Value> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .map_err(|e| BrowserError::Transport(format!("{}: {}", url, e)))?;
        parse_response(response)
    }

    fn get(&self, path: &str) -> BrowserResult<Value> {
        self.command(Method::GET, path, None)
    }

    fn post(&self, path: &str, body: Value) -> BrowserResult<Value> {
        self.command(Method::POST, path, Some(body))
    }

    fn get_string(&self, path: &str) -> BrowserResult<String> {
        let value = self.get(path)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected(path, &value))
    }

    fn get_bool(&self, path: &str) -> BrowserResult<bool> {
        let value = self.get(path)?;
        value.as_bool().ok_or_else(|| unexpected(path, &value))
    }
}

impl BrowserSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.post("/url", json!({ "url": url }))?;
        Ok(())
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        self.get_string("/url")
    }

    fn title(&mut self) -> BrowserResult<String> {
        self.get_string("/title")
    }

    fn find_elements(&mut self, locator: &Locator) -> BrowserResult<Vec<ElementRef>> {
        let (using, value) = strategy(locator);
        let found = self.post("/elements", json!({ "using": using, "value": value }))?;
        let items = found.as_array().ok_or_else(|| unexpected("/elements", &found))?;
        items
            .iter()
            .map(|item| {
                item.get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .map(|id| ElementRef(id.to_string()))
                    .ok_or_else(|| unexpected("/elements", item))
            })
            .collect()
    }

    fn text(&mut self, element: &ElementRef) -> BrowserResult<String> {
        self.get_string(&format!("/element/{}/text", element))
    }

    fn tag_name(&mut self, element: &ElementRef) -> BrowserResult<String> {
        self.get_string(&format!("/element/{}/name", element))
    }

    fn is_displayed(&mut self, element: &ElementRef) -> BrowserResult<bool> {
        self.get_bool(&format!("/element/{}/displayed", element))
    }

    fn is_enabled(&mut self, element: &ElementRef) -> BrowserResult<bool> {
        self.get_bool(&format!("/element/{}/enabled", element))
    }

    fn click(&mut self, element: &ElementRef) -> BrowserResult<()> {
        self.post(&format!("/element/{}/click", element), json!({}))?;
        Ok(())
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> BrowserResult<()> {
        self.post(&format!("/element/{}/value", element), json!({ "text": text }))?;
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> BrowserResult<()> {
        self.post(&format!("/element/{}/clear", element), json!({}))?;
        Ok(())
    }

    fn screenshot_png(&mut self) -> BrowserResult<Vec<u8>> {
        let encoded = self.get_string("/screenshot")?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| BrowserError::Protocol {
                error: "invalid screenshot".to_string(),
                message: e.to_string(),
            })
    }

    fn alert_text(&mut self) -> BrowserResult<String> {
        self.get_string("/alert/text")
    }

    fn accept_alert(&mut self) -> BrowserResult<()> {
        self.post("/alert/accept", json!({}))?;
        Ok(())
    }

    fn switch_to_frame(&mut self, frame: &ElementRef) -> BrowserResult<()> {
        self.post("/frame", json!({ "id": { ELEMENT_KEY: frame.0 } }))?;
        Ok(())
    }

    fn switch_to_parent_frame(&mut self) -> BrowserResult<()> {
        self.post("/frame/parent", json!({}))?;
        Ok(())
    }

    fn quit(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None)?;
        tracing::debug!("Closed WebDriver session {}", self.session_id);
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

/// Map a locator onto a WebDriver location strategy
fn strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::LinkText(text) => ("link text", text.clone()),
        Locator::ClassName(class) => ("css selector", format!(".{}", class)),
        Locator::Id(id) => ("css selector", format!("[id=\"{}\"]", id)),
        Locator::Name(name) => ("css selector", format!("[name=\"{}\"]", name)),
        Locator::Css(selector) => ("css selector", selector.clone()),
        Locator::XPath(expr) => ("xpath", expr.clone()),
    }
}

/// Unwrap the `value` member, translating protocol errors
fn parse_response(response: Response) -> BrowserResult<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .map_err(|e| BrowserError::Transport(format!("invalid response body: {}", e)))?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    Err(protocol_error(&value))
}

fn protocol_error(value: &Value) -> BrowserError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match error.as_str() {
        "no such element" => BrowserError::NoSuchElement(message),
        "stale element reference" => BrowserError::StaleElement(message),
        "no such alert" => BrowserError::NoSuchAlert,
        "session not created" => BrowserError::SessionNotCreated(message),
        _ => BrowserError::Protocol { error, message },
    }
}

fn unexpected(path: &str, value: &Value) -> BrowserError {
    BrowserError::Protocol {
        error: "unexpected response".to_string(),
        message: format!("{} returned {}", path, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn open_session(server: &mut Server) -> Box<dyn BrowserSession> {
        server
            .mock("POST", "/session")
            .match_body(Matcher::PartialJson(json!({
                "capabilities": {
                    "alwaysMatch": { "browserName": "chrome", "unhandledPromptBehavior": "ignore" }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value":{"sessionId":"abc123","capabilities":{}}}"#)
            .create();
        let factory = WebDriverFactory::new(server.url(), true).unwrap();
        factory.open().unwrap()
    }

    #[test]
    fn test_strategy_mapping() {
        assert_eq!(strategy(&Locator::link_text("Shop")), ("link text", "Shop".to_string()));
        assert_eq!(strategy(&Locator::class_name("btn")), ("css selector", ".btn".to_string()));
        assert_eq!(
            strategy(&Locator::name("username")),
            ("css selector", "[name=\"username\"]".to_string())
        );
        assert_eq!(strategy(&Locator::xpath("//tr")), ("xpath", "//tr".to_string()));
    }

    #[test]
    fn test_headless_capabilities() {
        let factory = WebDriverFactory::new("http://localhost:9515/", true).unwrap();
        let caps = factory.capabilities();
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert_eq!(factory.endpoint, "http://localhost:9515");
    }

    #[test]
    fn test_prompts_are_left_open() {
        let factory = WebDriverFactory::new("http://localhost:9515", false).unwrap();
        let caps = factory.capabilities();
        assert_eq!(caps["capabilities"]["alwaysMatch"]["unhandledPromptBehavior"], "ignore");
    }

    #[test]
    fn test_frame_switching() {
        let mut server = Server::new();
        let mut session = open_session(&mut server);

        let enter = server
            .mock("POST", "/session/abc123/frame")
            .match_body(Matcher::Json(json!({ "id": { ELEMENT_KEY: "frame-1" } })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create();
        let leave = server
            .mock("POST", "/session/abc123/frame/parent")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create();

        session.switch_to_frame(&ElementRef("frame-1".into())).unwrap();
        session.switch_to_parent_frame().unwrap();
        enter.assert();
        leave.assert();
    }

    #[test]
    fn test_find_elements_and_title() {
        let mut server = Server::new();
        let mut session = open_session(&mut server);

        server
            .mock("POST", "/session/abc123/elements")
            .match_body(Matcher::Json(json!({ "using": "link text", "value": "Shop" })))
            .with_status(200)
            .with_body(format!(
                r#"{{"value":[{{"{key}":"el-1"}},{{"{key}":"el-2"}}]}}"#,
                key = ELEMENT_KEY
            ))
            .create();
        server
            .mock("GET", "/session/abc123/title")
            .with_status(200)
            .with_body(r#"{"value":"GracefuLiving"}"#)
            .create();

        let found = session.find_elements(&Locator::link_text("Shop")).unwrap();
        assert_eq!(found, vec![ElementRef("el-1".into()), ElementRef("el-2".into())]);
        assert_eq!(session.title().unwrap(), "GracefuLiving");
    }

    #[test]
    fn test_error_mapping() {
        let mut server = Server::new();
        let mut session = open_session(&mut server);

        server
            .mock("GET", "/session/abc123/element/gone/text")
            .with_status(404)
            .with_body(r#"{"value":{"error":"stale element reference","message":"detached"}}"#)
            .create();
        server
            .mock("GET", "/session/abc123/alert/text")
            .with_status(404)
            .with_body(r#"{"value":{"error":"no such alert","message":""}}"#)
            .create();

        let err = session.text(&ElementRef("gone".into())).unwrap_err();
        assert!(matches!(err, BrowserError::StaleElement(ref m) if m == "detached"));
        assert!(matches!(session.alert_text().unwrap_err(), BrowserError::NoSuchAlert));
    }

    #[test]
    fn test_screenshot_decodes_base64_and_quit_is_idempotent() {
        let mut server = Server::new();
        let mut session = open_session(&mut server);

        let png = [0x89u8, 0x50, 0x4E, 0x47];
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        server
            .mock("GET", "/session/abc123/screenshot")
            .with_status(200)
            .with_body(format!(r#"{{"value":"{}"}}"#, encoded))
            .create();
        let delete = server
            .mock("DELETE", "/session/abc123")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create();

        assert_eq!(session.screenshot_png().unwrap(), png.to_vec());
        session.quit().unwrap();
        session.quit().unwrap();
        drop(session);
        delete.assert();
    }

    #[test]
    fn test_session_not_created() {
        let mut server = Server::new();
        server
            .mock("POST", "/session")
            .with_status(500)
            .with_body(
                r#"{"value":{"error":"session not created","message":"Chrome failed to start"}}"#,
            )
            .create();
        let factory = WebDriverFactory::new(server.url(), true).unwrap();
        let err = factory.open().err().unwrap();
        assert!(matches!(
            err,
            BrowserError::SessionNotCreated(ref m) if m.contains("Chrome failed")
        ));
    }
}
