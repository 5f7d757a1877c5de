//! Bounded polling of UI state.
//!
//! A [`Condition`] is a read-only question about the page. The
//! [`ConditionWaiter`] asks it repeatedly until it holds or the caller's
//! deadline passes. Timeouts are always per call: fast transitions use a
//! short budget, first page loads and list refreshes a long one.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::Url;

use crate::browser::{BrowserError, BrowserResult, BrowserSession, ElementRef, Locator};

use super::types::{HarnessError, HarnessResult};

/// A named predicate over the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// First matching element that is displayed and enabled
    ElementInteractable(Locator),
    /// First matching element that is displayed
    ElementVisible(Locator),
    UrlContains(String),
    /// Path component of the URL equals the route exactly
    PathIs(String),
    /// A dialog is open
    AlertPresent,
}

/// What a condition resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Element(ElementRef),
    Url(String),
    Alert(String),
}

impl Condition {
    pub fn interactable(locator: Locator) -> Self {
        Condition::ElementInteractable(locator)
    }

    pub fn visible(locator: Locator) -> Self {
        Condition::ElementVisible(locator)
    }

    pub fn url_contains(fragment: impl Into<String>) -> Self {
        Condition::UrlContains(fragment.into())
    }

    pub fn path_is(route: impl Into<String>) -> Self {
        Condition::PathIs(route.into())
    }

    pub fn description(&self) -> String {
        match self {
            Condition::ElementInteractable(l) => format!("{} to be clickable", l),
            Condition::ElementVisible(l) => format!("{} to be visible", l),
            Condition::UrlContains(f) => format!("URL to contain '{}'", f),
            Condition::PathIs(route) => format!("URL path to be '{}'", route),
            Condition::AlertPresent => "a dialog to open".to_string(),
        }
    }

    /// Evaluate once. `Ok(None)` means "not yet".
    pub fn evaluate(&self, session: &mut dyn BrowserSession) -> BrowserResult<Option<Resolved>> {
        match self {
            Condition::ElementInteractable(locator) => {
                for element in session.find_elements(locator)? {
                    if session.is_displayed(&element)? && session.is_enabled(&element)? {
                        return Ok(Some(Resolved::Element(element)));
                    }
                }
                Ok(None)
            }
            Condition::ElementVisible(locator) => {
                for element in session.find_elements(locator)? {
                    if session.is_displayed(&element)? {
                        return Ok(Some(Resolved::Element(element)));
                    }
                }
                Ok(None)
            }
            Condition::UrlContains(fragment) => {
                let url = session.current_url()?;
                Ok(url.contains(fragment.as_str()).then_some(Resolved::Url(url)))
            }
            Condition::PathIs(route) => {
                let url = session.current_url()?;
                let matches = Url::parse(&url).is_ok_and(|parsed| parsed.path() == route.as_str());
                Ok(matches.then_some(Resolved::Url(url)))
            }
            Condition::AlertPresent => match session.alert_text() {
                Ok(text) => Ok(Some(Resolved::Alert(text))),
                Err(BrowserError::NoSuchAlert) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }
}

/// Polls conditions at a fixed interval under a per-call deadline
#[derive(Debug, Clone, Copy)]
pub struct ConditionWaiter {
    poll_interval: Duration,
}

impl ConditionWaiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Block until `condition` holds or `timeout` elapses
    pub fn wait(
        &self,
        session: &mut dyn BrowserSession,
        condition: &Condition,
        timeout: Duration,
    ) -> HarnessResult<Resolved> {
        self.until(session, &condition.description(), timeout, |s| condition.evaluate(s))
    }

    /// Wait for an element condition and return the element
    pub fn element(
        &self,
        session: &mut dyn BrowserSession,
        condition: &Condition,
        timeout: Duration,
    ) -> HarnessResult<ElementRef> {
        match self.wait(session, condition, timeout)? {
            Resolved::Element(element) => Ok(element),
            other => Err(HarnessError::assertion(
                condition.description(),
                "an element",
                format!("{:?}", other),
            )),
        }
    }

    /// Generic polling loop.
    ///
    /// The probe is evaluated immediately, then after each interval until the
    /// deadline. Transient browser errors (element missing, stale, no dialog)
    /// count as "not yet"; any other error aborts the wait.
    pub fn until<T, F>(
        &self,
        session: &mut dyn BrowserSession,
        description: &str,
        timeout: Duration,
        mut probe: F,
    ) -> HarnessResult<T>
    where
        F: FnMut(&mut dyn BrowserSession) -> BrowserResult<Option<T>>,
    {
        if timeout.is_zero() {
            return Err(HarnessError::InvalidTimeout(description.to_string()));
        }

        let start = Instant::now();
        let mut polls = 0u32;
        loop {
            polls += 1;
            match probe(&mut *session) {
                Ok(Some(value)) => {
                    tracing::debug!(polls, elapsed = ?start.elapsed(), "Resolved: {}", description);
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) if e.is_transient() => {
                    tracing::trace!("Still waiting for {}: {}", description, e);
                }
                Err(e) => return Err(e.into()),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(HarnessError::Timeout {
                    description: description.to_string(),
                    elapsed,
                });
            }
            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }
}

impl Default for ConditionWaiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_POLL_INTERVAL_MS))
    }
}
