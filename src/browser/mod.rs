//! Browser session abstraction.
//!
//! The harness never resolves DOM locators itself. It hands a [`Locator`] to a
//! [`BrowserSession`] and gets opaque [`ElementRef`] handles back:
//! - [`WebDriverSession`] drives a real browser through the W3C WebDriver protocol
//! - [`MockBrowser`] answers from an in-memory storefront for dry runs and tests

pub mod mock;
pub mod webdriver;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::{MockBrowser, MockOptions, MockStorefront};
pub use webdriver::{WebDriverFactory, WebDriverSession};

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no element matches {0}")]
    NoSuchElement(String),

    #[error("element {0} is no longer attached to the page")]
    StaleElement(String),

    #[error("no dialog is open")]
    NoSuchAlert,

    #[error("could not start browser session: {0}")]
    SessionNotCreated(String),

    #[error("WebDriver error '{error}': {message}")]
    Protocol { error: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl BrowserError {
    /// Errors that mean "the page has not caught up yet" rather than "the session is broken"
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BrowserError::NoSuchElement(_)
                | BrowserError::StaleElement(_)
                | BrowserError::NoSuchAlert
        )
    }
}

/// How to find elements on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// Exact visible text of a link
    LinkText(String),
    /// A single CSS class name
    ClassName(String),
    /// Element id attribute
    Id(String),
    /// Form control `name` attribute
    Name(String),
    /// Arbitrary CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn link_text(text: impl Into<String>) -> Self {
        Locator::LinkText(text.into())
    }

    pub fn class_name(name: impl Into<String>) -> Self {
        Locator::ClassName(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::LinkText(t) => write!(f, "link text '{}'", t),
            Locator::ClassName(c) => write!(f, "class '{}'", c),
            Locator::Id(id) => write!(f, "id '{}'", id),
            Locator::Name(n) => write!(f, "name '{}'", n),
            Locator::Css(s) => write!(f, "css '{}'", s),
            Locator::XPath(x) => write!(f, "xpath '{}'", x),
        }
    }
}

/// Opaque handle to an element resolved by a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One browser session, exclusively owned by the scenario that opened it
pub trait BrowserSession {
    /// Load a URL and wait for the document to be ready
    fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    fn current_url(&mut self) -> BrowserResult<String>;

    fn title(&mut self) -> BrowserResult<String>;

    /// All elements matching the locator; empty when none match
    fn find_elements(&mut self, locator: &Locator) -> BrowserResult<Vec<ElementRef>>;

    /// Visible text of an element
    fn text(&mut self, element: &ElementRef) -> BrowserResult<String>;

    fn tag_name(&mut self, element: &ElementRef) -> BrowserResult<String>;

    fn is_displayed(&mut self, element: &ElementRef) -> BrowserResult<bool>;

    fn is_enabled(&mut self, element: &ElementRef) -> BrowserResult<bool>;

    fn click(&mut self, element: &ElementRef) -> BrowserResult<()>;

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> BrowserResult<()>;

    fn clear(&mut self, element: &ElementRef) -> BrowserResult<()>;

    /// PNG-encoded capture of the viewport
    fn screenshot_png(&mut self) -> BrowserResult<Vec<u8>>;

    /// Text of the open dialog, `NoSuchAlert` when none is open
    fn alert_text(&mut self) -> BrowserResult<String>;

    fn accept_alert(&mut self) -> BrowserResult<()>;

    /// Direct later commands into the given frame element
    fn switch_to_frame(&mut self, frame: &ElementRef) -> BrowserResult<()>;

    fn switch_to_parent_frame(&mut self) -> BrowserResult<()>;

    /// End the session. Must be safe to call more than once.
    fn quit(&mut self) -> BrowserResult<()>;
}

/// Creates fresh, isolated sessions
pub trait SessionFactory {
    fn open(&self) -> BrowserResult<Box<dyn BrowserSession>>;

    /// Short identifier used in logs and summaries (e.g. "webdriver", "mock")
    fn kind(&self) -> &str;
}

/// Scope guard that ends a session on every exit path
pub struct SessionGuard {
    session: Box<dyn BrowserSession>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self { session }
    }

    pub fn session(&mut self) -> &mut dyn BrowserSession {
        self.session.as_mut()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.quit() {
            tracing::warn!("Failed to end browser session: {}", e);
        }
    }
}
