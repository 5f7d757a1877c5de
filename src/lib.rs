//! Storefront Harness - browser-driven acceptance tests for a storefront and its admin.
//!
//! This crate provides:
//! - A bounded polling engine for UI conditions ([`ConditionWaiter`])
//! - Screenshot-after-action instrumentation ([`ActionRecorder`])
//! - Ordered scenarios with baselines, round-trip verification and cleanup ([`ScenarioRunner`])
//! - The admin login state machine and the storefront scenario catalog
//! - A W3C WebDriver client and an in-memory storefront for dry runs
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_harness::{
//!     Config, ResultReporter, ScenarioRunner, StorefrontSuite, WebDriverFactory,
//! };
//!
//! let config = Config::from_env();
//! let browser = &config.browser;
//! let factory = WebDriverFactory::new(&browser.webdriver_url, browser.headless).unwrap();
//! let runner = ScenarioRunner::from_config(&config, Box::new(factory));
//!
//! let mut reporter = ResultReporter::new();
//! runner.run_suite(&StorefrontSuite::new(&config).scenarios().unwrap(), &mut reporter);
//! println!("{}", reporter.summarize());
//! ```

pub mod browser;
pub mod config;
pub mod harness;
pub mod logging;
pub mod report;
pub mod snapshot;

pub use config::Config;

// Re-export browser collaborators
pub use browser::{
    BrowserError, BrowserResult, BrowserSession, ElementRef, Locator, MockOptions, MockStorefront,
    SessionFactory, SessionGuard, WebDriverFactory,
};

// Re-export harness types
pub use harness::{
    AdminState, AdminWorkflow, Condition, ConditionWaiter, HarnessError, HarnessResult, Scenario,
    ScenarioReport, ScenarioRunner, Step, StorefrontSuite,
};

pub use report::{OutcomeRecord, ResultReporter, RunSummary, TestOutcome};

pub use snapshot::{ActionEvent, ActionRecorder, ArtifactSink, DirectorySink};
