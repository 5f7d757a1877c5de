//! Screenshot-after-action instrumentation.
//!
//! [`ActionRecorder::instrument`] takes an interaction primitive and returns
//! an instrumented version of it. The instrumented version runs the action
//! first and, only if it succeeded, attempts a screenshot. Capture problems
//! are logged and swallowed: the caller always gets the action's own result.
//! An action that leaves a dialog open is not captured, so the dialog stays
//! open for the next step.

use std::path::PathBuf;
use std::sync::Arc;

use crate::browser::{BrowserResult, BrowserSession, ElementRef};

use super::sink::ArtifactSink;
use super::types::{ActionEvent, ArtifactResult};
use super::utils::sanitize_label;

/// Label used when neither the element's text nor its tag can be read
const FALLBACK_LABEL: &str = "element";

/// Wraps interactions so each one leaves a diagnostic artifact behind
#[derive(Clone)]
pub struct ActionRecorder {
    sink: Option<Arc<dyn ArtifactSink>>,
}

impl ActionRecorder {
    pub fn new(sink: Arc<dyn ArtifactSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A recorder that produces events but never captures
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Instrument an interaction.
    ///
    /// `prefix` names the action kind ("click", "submit") and starts the
    /// artifact filename. The returned closure yields exactly one
    /// [`ActionEvent`] per successful call.
    pub fn instrument<'a, A>(
        &'a self,
        prefix: &'a str,
        mut action: A,
    ) -> impl FnMut(&mut dyn BrowserSession, &ElementRef) -> BrowserResult<ActionEvent> + 'a
    where
        A: FnMut(&mut dyn BrowserSession, &ElementRef) -> BrowserResult<()> + 'a,
    {
        move |session: &mut dyn BrowserSession, element: &ElementRef| {
            // Read before acting: a click that navigates detaches the element.
            let label = element_label(session, element);
            action(&mut *session, element)?;
            Ok(self.capture(prefix, &label, session))
        }
    }

    fn capture(&self, prefix: &str, label: &str, session: &mut dyn BrowserSession) -> ActionEvent {
        let event_label = format!("{}_{}", prefix, label);
        let Some(sink) = &self.sink else {
            return ActionEvent::new(event_label, None);
        };
        if let Ok(text) = session.alert_text() {
            tracing::debug!("Screenshot for {} skipped: dialog '{}' is open", event_label, text);
            return ActionEvent::new(event_label, None);
        }

        let artifact = match try_capture(sink.as_ref(), prefix, label, session) {
            Ok(path) => {
                tracing::info!("Saved screenshot to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Screenshot for {} skipped: {}", event_label, e);
                None
            }
        };
        ActionEvent::new(event_label, artifact)
    }
}

impl std::fmt::Debug for ActionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRecorder")
            .field("capturing", &self.sink.is_some())
            .finish()
    }
}

fn try_capture(
    sink: &dyn ArtifactSink,
    prefix: &str,
    label: &str,
    session: &mut dyn BrowserSession,
) -> ArtifactResult<PathBuf> {
    let png = session.screenshot_png()?;
    sink.store(prefix, label, &png)
}

/// Filesystem-safe label: visible text, else tag name, else a constant
fn element_label(session: &mut dyn BrowserSession, element: &ElementRef) -> String {
    let text = session
        .text(element)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let raw = match text {
        Some(text) => text,
        None => session
            .tag_name(element)
            .unwrap_or_else(|_| FALLBACK_LABEL.to_string()),
    };
    let label = sanitize_label(&raw);
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Locator, MockOptions, MockStorefront};
    use crate::harness::markup;
    use crate::snapshot::DirectorySink;

    const BASE: &str = "http://shop.test";

    fn click(session: &mut dyn BrowserSession, element: &ElementRef) -> BrowserResult<()> {
        session.click(element)
    }

    #[test]
    fn test_click_is_captured_after_action() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = ActionRecorder::new(Arc::new(DirectorySink::new(tmp.path().join("shots"))));
        let store = MockStorefront::new(BASE, MockOptions::default());
        let mut browser = store.browser();
        browser.navigate(BASE).unwrap();
        let shop = browser.find_elements(&markup::shop_link()).unwrap().remove(0);

        let mut instrumented = recorder.instrument("click", click);
        let event = instrumented(&mut browser, &shop).unwrap();

        assert_eq!(event.label, "click_Shop");
        let artifact = event.artifact.expect("artifact written");
        assert!(artifact.exists());
        assert_eq!(browser.current_url().unwrap(), "http://shop.test/shop");
    }

    #[test]
    fn test_empty_text_falls_back_to_tag() {
        let recorder = ActionRecorder::disabled();
        let store = MockStorefront::new(BASE, MockOptions::default());
        let mut browser = store.browser();
        browser.navigate(&format!("{}/login/admin", BASE)).unwrap();
        let field = browser.find_elements(&Locator::class_name("username-box")).unwrap().remove(0);

        let mut instrumented = recorder.instrument("click", click);
        let event = instrumented(&mut browser, &field).unwrap();
        assert_eq!(event.label, "click_input");
        assert!(event.artifact.is_none());
    }

    #[test]
    fn test_capture_failure_does_not_fail_action() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let recorder = ActionRecorder::new(Arc::new(DirectorySink::new(&blocker)));

        let store = MockStorefront::new(BASE, MockOptions::default());
        let mut browser = store.browser();
        browser.navigate(BASE).unwrap();
        let shop = browser.find_elements(&markup::shop_link()).unwrap().remove(0);

        let mut instrumented = recorder.instrument("click", click);
        let event = instrumented(&mut browser, &shop).unwrap();
        assert!(event.artifact.is_none());
        assert!(browser.current_url().unwrap().ends_with("/shop"));
    }

    #[test]
    fn test_open_dialog_is_not_captured() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = Arc::new(DirectorySink::new(tmp.path()));
        let recorder = ActionRecorder::new(sink.clone());
        let store = MockStorefront::new(BASE, MockOptions::default().list_lag(0));
        store.seed_product("test", "test");
        let mut browser = store.browser();
        browser.navigate(&format!("{}/login/admin", BASE)).unwrap();
        let credentials = [
            (markup::username_field(), "terry"),
            (markup::password_field(), "changeme"),
        ];
        for (locator, text) in credentials {
            let field = browser.find_elements(&locator).unwrap().remove(0);
            browser.send_keys(&field, text).unwrap();
        }
        let submit = browser.find_elements(&markup::login_submit()).unwrap().remove(0);
        browser.click(&submit).unwrap();
        browser.navigate(&format!("{}/shop/admin/list", BASE)).unwrap();
        let delete = browser.find_elements(&markup::product_delete("test")).unwrap().remove(0);

        let mut instrumented = recorder.instrument("click", click);
        let event = instrumented(&mut browser, &delete).unwrap();
        assert_eq!(event.label, "click_Delete");
        assert!(event.artifact.is_none());
        assert!(sink.list_artifacts().unwrap().is_empty());

        // The confirmation is still there to accept
        assert_eq!(browser.alert_text().unwrap(), "Delete test?");
        browser.accept_alert().unwrap();
        assert_eq!(store.product_count("test"), 0);
    }

    #[test]
    fn test_failed_action_is_not_captured() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = Arc::new(DirectorySink::new(tmp.path()));
        let recorder = ActionRecorder::new(sink.clone());
        let store = MockStorefront::new(BASE, MockOptions::default());
        let mut browser = store.browser();
        browser.navigate(BASE).unwrap();

        let mut instrumented = recorder.instrument("click", click);
        assert!(instrumented(&mut browser, &ElementRef("0:0".into())).is_err());
        assert!(sink.list_artifacts().unwrap().is_empty());
    }
}
