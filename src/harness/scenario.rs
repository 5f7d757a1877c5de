//! Scenario definitions and the runner that executes them.
//!
//! A [`Scenario`] is an ordered list of [`Step`]s plus cleanup steps. The
//! [`ScenarioRunner`] gives every scenario its own browser session, runs the
//! steps strictly in order and turns the first failure into a failed
//! [`ScenarioReport`]. Failures never escape `run`: the next scenario starts
//! from a fresh session regardless.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::browser::{
    BrowserResult, BrowserSession, ElementRef, Locator, SessionFactory, SessionGuard,
};
use crate::config::Config;
use crate::report::ResultReporter;
use crate::snapshot::{ActionEvent, ActionRecorder, DirectorySink};

use super::types::{HarnessError, HarnessResult};
use super::wait::{Condition, ConditionWaiter};

/// How an element is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click,
    /// Click that submits a form; recorded under its own prefix
    Submit,
    /// Replace the field's content
    Type(String),
}

/// A numeric reading of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Number of elements matching the locator
    Count(Locator),
    /// Integer shown by the first matching element; absent reads as zero
    Quantity(Locator),
}

/// Value a probe is expected to reach
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Exact(u32),
    /// A previously measured value plus `delta`
    Relative { key: String, delta: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    TitleEquals(String),
    UrlContains(String),
    UrlExcludes(String),
    /// Read the probe once and compare
    ProbeEquals { probe: Probe, expected: Expected },
    /// Compare two values already measured, without reading the page
    ValueEquals { key: String, expected: Expected },
}

/// One unit of work in a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Load a route relative to the base URL
    Navigate { path: String },
    /// Wait for the element and interact with it
    Act {
        locator: Locator,
        interaction: Interaction,
        timeout: Duration,
    },
    WaitFor { condition: Condition, timeout: Duration },
    Assert(Assertion),
    /// Record a baseline under `key`.
    ///
    /// A `Quantity` whose element never shows up within `timeout` records 0.
    Measure {
        key: String,
        probe: Probe,
        timeout: Duration,
    },
    /// Re-poll the probe until it reads the expected value
    AwaitValue {
        probe: Probe,
        expected: Expected,
        timeout: Duration,
    },
    /// End the scenario successfully when `key` was measured as zero,
    /// after checking that `absent` really matches nothing
    FinishIfZero { key: String, absent: Locator },
    /// Wait for a dialog and confirm it
    AcceptAlert { timeout: Duration },
    /// Wait for a frame element and direct later steps into it
    EnterFrame { locator: Locator, timeout: Duration },
    /// Return to the parent browsing context
    LeaveFrame,
}

impl Step {
    pub fn navigate(path: impl Into<String>) -> Self {
        Step::Navigate { path: path.into() }
    }

    pub fn click(locator: Locator, timeout: Duration) -> Self {
        Step::Act {
            locator,
            interaction: Interaction::Click,
            timeout,
        }
    }

    pub fn submit(locator: Locator, timeout: Duration) -> Self {
        Step::Act {
            locator,
            interaction: Interaction::Submit,
            timeout,
        }
    }

    pub fn type_text(locator: Locator, text: impl Into<String>, timeout: Duration) -> Self {
        Step::Act {
            locator,
            interaction: Interaction::Type(text.into()),
            timeout,
        }
    }

    pub fn wait_for(condition: Condition, timeout: Duration) -> Self {
        Step::WaitFor { condition, timeout }
    }

    pub fn measure(key: impl Into<String>, probe: Probe, timeout: Duration) -> Self {
        Step::Measure {
            key: key.into(),
            probe,
            timeout,
        }
    }

    pub fn await_value(probe: Probe, expected: Expected, timeout: Duration) -> Self {
        Step::AwaitValue {
            probe,
            expected,
            timeout,
        }
    }

    pub fn enter_frame(locator: Locator, timeout: Duration) -> Self {
        Step::EnterFrame { locator, timeout }
    }

    /// Short human-readable form used in logs
    pub fn describe(&self) -> String {
        match self {
            Step::Navigate { path } => format!("navigate to {}", path),
            Step::Act {
                locator,
                interaction,
                ..
            } => match interaction {
                Interaction::Click => format!("click {}", locator),
                Interaction::Submit => format!("submit via {}", locator),
                Interaction::Type(_) => format!("type into {}", locator),
            },
            Step::WaitFor { condition, .. } => format!("wait for {}", condition.description()),
            Step::Assert(assertion) => format!("assert {:?}", assertion),
            Step::Measure { key, probe, .. } => format!("measure {} as '{}'", probe, key),
            Step::AwaitValue { probe, expected, .. } => format!("await {} == {}", probe, expected),
            Step::FinishIfZero { key, .. } => format!("finish early if '{}' is 0", key),
            Step::AcceptAlert { .. } => "accept dialog".to_string(),
            Step::EnterFrame { locator, .. } => format!("enter frame {}", locator),
            Step::LeaveFrame => "leave frame".to_string(),
        }
    }
}

impl std::fmt::Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probe::Count(locator) => write!(f, "count of {}", locator),
            Probe::Quantity(locator) => write!(f, "quantity in {}", locator),
        }
    }
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Exact(value) => write!(f, "{}", value),
            Expected::Relative { key, delta } => write!(f, "{}{:+}", key, delta),
        }
    }
}

/// A single reading taken by a [`Probe`]
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sample {
    Value(u32),
    Absent,
    Unparsable(String),
}

impl Probe {
    fn sample(&self, session: &mut dyn BrowserSession) -> BrowserResult<Sample> {
        match self {
            Probe::Count(locator) => {
                let count = session.find_elements(locator)?.len();
                Ok(Sample::Value(u32::try_from(count).unwrap_or(u32::MAX)))
            }
            Probe::Quantity(locator) => {
                let Some(element) = session.find_elements(locator)?.into_iter().next() else {
                    return Ok(Sample::Absent);
                };
                let text = session.text(&element)?;
                Ok(match text.trim().parse() {
                    Ok(value) => Sample::Value(value),
                    Err(_) => Sample::Unparsable(text),
                })
            }
        }
    }
}

/// An ordered, non-branching workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
    /// Runs after the steps whatever their outcome
    pub cleanup: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            cleanup: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn cleanup(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.cleanup.extend(steps);
        self
    }
}

/// State carried between the steps of one scenario
#[derive(Debug, Default)]
pub struct ScenarioContext {
    values: BTreeMap<String, u32>,
    events: Vec<ActionEvent>,
    completed: usize,
}

impl ScenarioContext {
    pub fn value(&self, key: &str) -> HarnessResult<u32> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| HarnessError::MissingValue(key.to_string()))
    }

    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    fn resolve(&self, expected: &Expected) -> HarnessResult<u32> {
        match expected {
            Expected::Exact(value) => Ok(*value),
            Expected::Relative { key, delta } => {
                let base = self.value(key)?;
                let target = i64::from(base) + delta;
                u32::try_from(target).map_err(|_| {
                    HarnessError::assertion(
                        format!("expected value {}{:+} is out of range", key, delta),
                        "a count >= 0",
                        target,
                    )
                })
            }
        }
    }
}

/// Whether the scenario goes on after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    Continue,
    Finish,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    /// Failure message, if any
    pub message: Option<String>,
    /// Failure category ("timeout", "assertion", ...)
    pub failure_kind: Option<String>,
    /// Steps that finished before the scenario ended
    pub steps_completed: usize,
    pub steps_total: usize,
    /// Instrumented interactions, in order
    pub events: Vec<ActionEvent>,
    pub duration_ms: u64,
}

/// Executes scenarios, one isolated browser session each
pub struct ScenarioRunner {
    factory: Box<dyn SessionFactory>,
    waiter: ConditionWaiter,
    recorder: ActionRecorder,
    base_url: String,
}

impl ScenarioRunner {
    pub fn new(factory: Box<dyn SessionFactory>, base_url: impl Into<String>) -> Self {
        Self {
            factory,
            waiter: ConditionWaiter::default(),
            recorder: ActionRecorder::disabled(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Runner wired from configuration: configured poll interval and a
    /// directory sink at the artifact dir
    pub fn from_config(config: &Config, factory: Box<dyn SessionFactory>) -> Self {
        let sink = DirectorySink::new(config.browser.artifact_dir.clone());
        Self::new(factory, config.target.base_url.clone())
            .with_waiter(ConditionWaiter::new(config.browser.poll_interval))
            .with_recorder(ActionRecorder::new(Arc::new(sink)))
    }

    pub fn with_waiter(mut self, waiter: ConditionWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub fn with_recorder(mut self, recorder: ActionRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run every scenario in order and record each outcome
    pub fn run_suite(
        &self,
        scenarios: &[Scenario],
        reporter: &mut ResultReporter,
    ) -> Vec<ScenarioReport> {
        scenarios
            .iter()
            .map(|scenario| {
                let report = self.run(scenario);
                reporter.record_outcome(&report.name, report.passed, report.message.clone());
                report
            })
            .collect()
    }

    /// Run one scenario in a fresh session.
    ///
    /// The session is released on every exit path, after cleanup steps ran.
    pub fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let start = Instant::now();
        tracing::info!("Scenario {} started ({} session)", scenario.name, self.factory.kind());

        let mut ctx = ScenarioContext::default();
        let result = match self.factory.open() {
            Ok(session) => {
                let mut guard = SessionGuard::new(session);
                let result = self.execute(guard.session(), &scenario.steps, &mut ctx);
                let completed = ctx.completed;
                if !scenario.cleanup.is_empty() {
                    if let Err(e) = self.execute(guard.session(), &scenario.cleanup, &mut ctx) {
                        tracing::warn!("Cleanup of {} failed: {}", scenario.name, e);
                    }
                }
                ctx.completed = completed;
                result
            }
            Err(e) => Err(HarnessError::Browser(e)),
        };

        let (passed, message, failure_kind) = match &result {
            Ok(()) => (true, None, None),
            Err(e) => (false, Some(e.to_string()), Some(e.kind().to_string())),
        };
        let duration = start.elapsed();
        if passed {
            tracing::info!("Scenario {} passed in {:.1?}", scenario.name, duration);
        } else {
            tracing::info!(
                "Scenario {} failed after {} of {} steps: {}",
                scenario.name,
                ctx.completed,
                scenario.steps.len(),
                message.as_deref().unwrap_or_default()
            );
        }

        ScenarioReport {
            name: scenario.name.clone(),
            passed,
            message,
            failure_kind,
            steps_completed: ctx.completed,
            steps_total: scenario.steps.len(),
            events: ctx.events,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn execute(
        &self,
        session: &mut dyn BrowserSession,
        steps: &[Step],
        ctx: &mut ScenarioContext,
    ) -> HarnessResult<()> {
        ctx.completed = 0;
        for step in steps {
            tracing::debug!("Step {}: {}", ctx.completed + 1, step.describe());
            let flow = self.step(session, step, ctx)?;
            ctx.completed += 1;
            if flow == StepFlow::Finish {
                tracing::debug!("Finished early after {}", step.describe());
                break;
            }
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Execute a single step
    pub fn step(
        &self,
        session: &mut dyn BrowserSession,
        step: &Step,
        ctx: &mut ScenarioContext,
    ) -> HarnessResult<StepFlow> {
        match step {
            Step::Navigate { path } => {
                session.navigate(&self.url(path))?;
            }
            Step::Act {
                locator,
                interaction,
                timeout,
            } => self.act(session, locator, interaction, *timeout, ctx)?,
            Step::WaitFor { condition, timeout } => {
                self.waiter.wait(session, condition, *timeout)?;
            }
            Step::Assert(assertion) => check(session, assertion, ctx)?,
            Step::Measure { key, probe, timeout } => {
                let value = self.measure(session, probe, *timeout)?;
                tracing::debug!("Measured {} = {}", key, value);
                ctx.values.insert(key.clone(), value);
            }
            Step::AwaitValue {
                probe,
                expected,
                timeout,
            } => {
                let target = ctx.resolve(expected)?;
                self.await_value(session, probe, target, *timeout)?;
            }
            Step::FinishIfZero { key, absent } => {
                if ctx.value(key)? == 0 {
                    let found = session.find_elements(absent)?.len();
                    if found != 0 {
                        return Err(HarnessError::assertion(
                            format!("'{}' measured 0 but {} is present", key, absent),
                            0,
                            found,
                        ));
                    }
                    return Ok(StepFlow::Finish);
                }
            }
            Step::AcceptAlert { timeout } => {
                self.waiter.wait(session, &Condition::AlertPresent, *timeout)?;
                session.accept_alert()?;
            }
            Step::EnterFrame { locator, timeout } => {
                let frame = self
                    .waiter
                    .element(session, &Condition::visible(locator.clone()), *timeout)?;
                session.switch_to_frame(&frame)?;
            }
            Step::LeaveFrame => session.switch_to_parent_frame()?,
        }
        Ok(StepFlow::Continue)
    }

    fn act(
        &self,
        session: &mut dyn BrowserSession,
        locator: &Locator,
        interaction: &Interaction,
        timeout: Duration,
        ctx: &mut ScenarioContext,
    ) -> HarnessResult<()> {
        let prefix = match interaction {
            Interaction::Type(text) => {
                let field = self
                    .waiter
                    .element(session, &Condition::visible(locator.clone()), timeout)?;
                session.clear(&field)?;
                session.send_keys(&field, text)?;
                return Ok(());
            }
            Interaction::Click => "click",
            Interaction::Submit => "submit",
        };

        let element = self
            .waiter
            .element(session, &Condition::interactable(locator.clone()), timeout)?;
        let mut activate = self.recorder.instrument(prefix, click);
        let event = activate(session, &element)?;
        ctx.events.push(event);
        Ok(())
    }

    fn measure(
        &self,
        session: &mut dyn BrowserSession,
        probe: &Probe,
        timeout: Duration,
    ) -> HarnessResult<u32> {
        let sample = match probe {
            Probe::Count(_) => probe.sample(session)?,
            Probe::Quantity(_) => {
                let description = format!("{} to appear", probe);
                let present = self.waiter.until(session, &description, timeout, |s| {
                    Ok(match probe.sample(s)? {
                        Sample::Absent => None,
                        other => Some(other),
                    })
                });
                match present {
                    Ok(sample) => sample,
                    Err(e) if e.is_timeout() => {
                        tracing::debug!("{} absent; using baseline 0", probe);
                        Sample::Value(0)
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        sample_value(probe, sample)
    }

    fn await_value(
        &self,
        session: &mut dyn BrowserSession,
        probe: &Probe,
        target: u32,
        timeout: Duration,
    ) -> HarnessResult<()> {
        let description = format!("{} to equal {}", probe, target);
        let mut last = None;
        let result = self.waiter.until(session, &description, timeout, |s| {
            let sample = probe.sample(s)?;
            let matched = matches!(sample, Sample::Value(v) if v == target)
                || (target == 0 && sample == Sample::Absent);
            last = Some(sample);
            Ok(matched.then_some(()))
        });
        match result {
            Err(HarnessError::Timeout { description, elapsed }) => Err(HarnessError::Timeout {
                description: match last {
                    Some(sample) => format!("{} (last read {})", description, sample),
                    None => description,
                },
                elapsed,
            }),
            other => other,
        }
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sample::Value(value) => write!(f, "{}", value),
            Sample::Absent => f.write_str("nothing"),
            Sample::Unparsable(text) => write!(f, "'{}'", text),
        }
    }
}

fn click(session: &mut dyn BrowserSession, element: &ElementRef) -> BrowserResult<()> {
    session.click(element)
}

fn sample_value(probe: &Probe, sample: Sample) -> HarnessResult<u32> {
    match sample {
        Sample::Value(value) => Ok(value),
        Sample::Absent => Ok(0),
        Sample::Unparsable(text) => Err(HarnessError::assertion(
            format!("{} is not a number", probe),
            "an integer",
            text,
        )),
    }
}

fn check(
    session: &mut dyn BrowserSession,
    assertion: &Assertion,
    ctx: &ScenarioContext,
) -> HarnessResult<()> {
    match assertion {
        Assertion::TitleEquals(expected) => {
            let title = session.title()?;
            if title != *expected {
                return Err(HarnessError::assertion("page title", expected, title));
            }
        }
        Assertion::UrlContains(fragment) => {
            let url = session.current_url()?;
            if !url.contains(fragment.as_str()) {
                let expected = format!("to contain '{}'", fragment);
                return Err(HarnessError::assertion("current URL", expected, url));
            }
        }
        Assertion::UrlExcludes(fragment) => {
            let url = session.current_url()?;
            if url.contains(fragment.as_str()) {
                let expected = format!("not to contain '{}'", fragment);
                return Err(HarnessError::assertion("current URL", expected, url));
            }
        }
        Assertion::ProbeEquals { probe, expected } => {
            let target = ctx.resolve(expected)?;
            let actual = sample_value(probe, probe.sample(session)?)?;
            if actual != target {
                return Err(HarnessError::assertion(probe.to_string(), target, actual));
            }
        }
        Assertion::ValueEquals { key, expected } => {
            let target = ctx.resolve(expected)?;
            let actual = ctx.value(key)?;
            if actual != target {
                return Err(HarnessError::assertion(format!("'{}'", key), target, actual));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MockOptions, MockStorefront};
    use crate::harness::admin::{AdminState, AdminWorkflow, Credentials};
    use crate::harness::markup::{self, routes};

    const BASE: &str = "http://shop.test";
    const SHORT: Duration = Duration::from_millis(100);

    fn runner(store: &MockStorefront) -> ScenarioRunner {
        ScenarioRunner::new(Box::new(store.clone()), BASE)
            .with_waiter(ConditionWaiter::new(Duration::from_millis(2)))
    }

    #[test]
    fn test_steps_run_in_order_and_pass() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let scenario = Scenario::new("shop_link", "home to shop")
            .step(Step::navigate(routes::HOME))
            .step(Step::Assert(Assertion::TitleEquals("GracefuLiving".into())))
            .step(Step::click(markup::shop_link(), SHORT))
            .step(Step::wait_for(Condition::url_contains("/shop"), SHORT));

        let report = runner(&store).run(&scenario);
        assert!(report.passed, "{:?}", report.message);
        assert_eq!(report.steps_completed, 4);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].label, "click_Shop");
    }

    #[test]
    fn test_assertion_failure_skips_remaining_steps() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let scenario = Scenario::new("bad_title", "")
            .step(Step::navigate(routes::HOME))
            .step(Step::Assert(Assertion::TitleEquals("Home".into())))
            .step(Step::click(markup::shop_link(), SHORT));

        let report = runner(&store).run(&scenario);
        assert!(!report.passed);
        assert_eq!(report.failure_kind.as_deref(), Some("assertion"));
        assert_eq!(report.steps_completed, 1);
        assert!(report.events.is_empty());
        assert_eq!(
            report.message.as_deref(),
            Some("page title: expected Home, got GracefuLiving")
        );
    }

    #[test]
    fn test_missing_quantity_measures_zero() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let probe = Probe::Quantity(markup::cart_quantity("Yoga Lessons"));
        let scenario = Scenario::new("baseline", "")
            .step(Step::navigate(routes::CART))
            .step(Step::measure("before", probe.clone(), Duration::from_millis(20)))
            .step(Step::Assert(Assertion::ProbeEquals {
                probe,
                expected: Expected::Relative {
                    key: "before".into(),
                    delta: 0,
                },
            }));

        let report = runner(&store).run(&scenario);
        assert!(report.passed, "{:?}", report.message);
    }

    #[test]
    fn test_await_value_timeout_reports_last_reading() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let scenario = Scenario::new("never", "")
            .step(Step::navigate(routes::SHOP))
            .step(Step::await_value(
                Probe::Count(markup::shop_card()),
                Expected::Exact(5),
                Duration::from_millis(30),
            ));

        let report = runner(&store).run(&scenario);
        assert_eq!(report.failure_kind.as_deref(), Some("timeout"));
        let message = report.message.unwrap();
        assert!(message.contains("to equal 5 (last read 2)"), "{}", message);
    }

    #[test]
    fn test_finish_if_zero_short_circuits() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let row = markup::shop_card();
        let scenario = Scenario::new("nothing_to_do", "")
            .step(Step::navigate(routes::CART))
            .step(Step::measure("cards", Probe::Count(row.clone()), SHORT))
            .step(Step::FinishIfZero {
                key: "cards".into(),
                absent: row,
            })
            .step(Step::Assert(Assertion::TitleEquals("unreachable".into())));

        let report = runner(&store).run(&scenario);
        assert!(report.passed, "{:?}", report.message);
        assert_eq!(report.steps_completed, 3);
    }

    #[test]
    fn test_relative_expectation_needs_measured_key() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let scenario = Scenario::new("unmeasured", "").step(Step::await_value(
            Probe::Count(markup::shop_card()),
            Expected::Relative {
                key: "before".into(),
                delta: 1,
            },
            SHORT,
        ));

        let report = runner(&store).run(&scenario);
        assert_eq!(report.failure_kind.as_deref(), Some("definition"));
    }

    #[test]
    fn test_cleanup_runs_after_failure_and_session_is_released() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let scenario = Scenario::new("fails", "")
            .step(Step::navigate(routes::HOME))
            .step(Step::wait_for(Condition::url_contains("/never"), Duration::from_millis(10)))
            .cleanup([Step::navigate(routes::SHOP), Step::click(markup::shop_card(), SHORT)]);

        let report = runner(&store).run(&scenario);
        assert!(!report.passed);
        assert_eq!(report.steps_completed, 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.sessions_closed(), 1);
    }

    #[test]
    fn test_value_equals_compares_measured_values() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let cards = Probe::Count(markup::shop_card());
        let same = Assertion::ValueEquals {
            key: "second".into(),
            expected: Expected::Relative {
                key: "first".into(),
                delta: 0,
            },
        };
        let scenario = Scenario::new("stable", "")
            .step(Step::navigate(routes::SHOP))
            .step(Step::measure("first", cards.clone(), SHORT))
            .step(Step::measure("second", cards, SHORT))
            .step(Step::Assert(same));
        let report = runner(&store).run(&scenario);
        assert!(report.passed, "{:?}", report.message);

        let off_by_one = Scenario::new("moved", "")
            .step(Step::navigate(routes::SHOP))
            .step(Step::measure("first", Probe::Count(markup::shop_card()), SHORT))
            .step(Step::Assert(Assertion::ValueEquals {
                key: "first".into(),
                expected: Expected::Exact(3),
            }));
        let report = runner(&store).run(&off_by_one);
        assert_eq!(report.failure_kind.as_deref(), Some("assertion"));
        assert_eq!(report.message.as_deref(), Some("'first': expected 3, got 2"));
    }

    #[test]
    fn test_frame_steps_switch_context() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let admin = AdminWorkflow::new(Credentials::new("terry", "changeme"), SHORT, SHORT);
        let header = Condition::visible(markup::about_header());
        let scenario = Scenario::new("about_frame", "")
            .steps(admin.reach(AdminState::ContentManagement).unwrap())
            .step(Step::click(markup::about_tab(), SHORT))
            .step(Step::enter_frame(markup::about_frame(), SHORT))
            .step(Step::wait_for(header, SHORT))
            .step(Step::LeaveFrame)
            .step(Step::Assert(Assertion::ProbeEquals {
                probe: Probe::Count(markup::about_header()),
                expected: Expected::Exact(0),
            }));
        let report = runner(&store).run(&scenario);
        assert!(report.passed, "{:?}", report.message);

        // A locator that is not a frame cannot be entered
        let wrong = Scenario::new("not_a_frame", "")
            .steps(admin.reach(AdminState::ContentManagement).unwrap())
            .step(Step::click(markup::about_tab(), SHORT))
            .step(Step::enter_frame(markup::about_panel(), SHORT));
        let report = runner(&store).run(&wrong);
        assert_eq!(report.failure_kind.as_deref(), Some("browser"));
    }

    #[test]
    fn test_run_suite_records_every_scenario() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let good = Scenario::new("good", "").step(Step::navigate(routes::HOME));
        let bad =
            Scenario::new("bad", "").step(Step::Assert(Assertion::UrlContains("/shop".into())));

        let mut reporter = ResultReporter::new();
        let reports = runner(&store).run_suite(&[bad, good], &mut reporter);
        assert_eq!(reports.len(), 2);

        let summary = reporter.summarize();
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(store.sessions_opened(), 2);
        assert_eq!(store.sessions_closed(), 2);
    }
}
