//! Runs the storefront suite end to end against the simulated storefront.

use std::path::Path;
use std::time::Duration;

use storefront_harness::browser::{BrowserSession, MockOptions, MockStorefront};
use storefront_harness::harness::markup::{self, routes};
use storefront_harness::harness::scenario::{Expected, Probe, ScenarioContext};
use storefront_harness::harness::{ScenarioReport, ScenarioRunner, Step, StorefrontSuite};
use storefront_harness::snapshot::DirectorySink;
use storefront_harness::{ActionRecorder, Config, ResultReporter, RunSummary};

const BASE: &str = "http://storefront.test";

fn config(artifacts: &Path) -> Config {
    Config::defaults()
        .with_base_url(BASE)
        .with_artifact_dir(artifacts)
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(250))
        .with_poll_interval(Duration::from_millis(2))
}

fn run_suite(store: &MockStorefront, config: &Config) -> (Vec<ScenarioReport>, RunSummary) {
    let runner = ScenarioRunner::from_config(config, Box::new(store.clone()));
    let scenarios = StorefrontSuite::new(config).scenarios().unwrap();
    let mut reporter = ResultReporter::new();
    let reports = runner.run_suite(&scenarios, &mut reporter);
    (reports, reporter.summarize())
}

fn failed(reports: &[ScenarioReport]) -> Vec<&str> {
    reports.iter().filter(|r| !r.passed).map(|r| r.name.as_str()).collect()
}

#[test]
fn test_full_suite_passes_on_mock() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&tmp.path().join("screenshots"));
    let store = MockStorefront::new(BASE, MockOptions::default());

    let (reports, summary) = run_suite(&store, &config);

    assert_eq!(failed(&reports), Vec::<&str>::new());
    assert!(summary.all_passed());
    assert_eq!(summary.completed, reports.len());

    // One isolated session per scenario, all released
    assert_eq!(store.sessions_opened(), reports.len());
    assert_eq!(store.sessions_closed(), reports.len());

    // The fixtures never outlive their scenarios
    assert_eq!(store.product_count("test"), 0);
    assert_eq!(store.content_block_count("About Block Title"), 0);

    // The delete click leaves its dialog open, so it is recorded without a capture
    let round_trip = reports.iter().find(|r| r.name == "product_round_trip").unwrap();
    let delete = round_trip.events.iter().find(|e| e.label == "click_Delete").unwrap();
    assert!(delete.artifact.is_none());

    let artifacts = DirectorySink::new(&config.browser.artifact_dir).list_artifacts().unwrap();
    assert!(!artifacts.is_empty());
    for artifact in &artifacts {
        let name = artifact.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("click_") || name.starts_with("submit_"), "{}", name);
    }
}

#[test]
fn test_slow_list_refresh_is_tolerated() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let store = MockStorefront::new(BASE, MockOptions::default().list_lag(8));

    let (reports, _) = run_suite(&store, &config);
    let round_trip = reports.iter().find(|r| r.name == "product_round_trip").unwrap();
    assert!(round_trip.passed, "{:?}", round_trip.message);
    assert_eq!(store.product_count("test"), 0);
}

#[test]
fn test_broken_title_fails_only_its_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let options = MockOptions {
        home_title: "Home".to_string(),
        ..MockOptions::default()
    };
    let store = MockStorefront::new(BASE, options);

    let (reports, summary) = run_suite(&store, &config);
    assert_eq!(failed(&reports), vec!["home_title"]);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        reports[0].message.as_deref(),
        Some("page title: expected GracefuLiving, got Home")
    );
    assert_eq!(store.sessions_closed(), reports.len());
}

#[test]
fn test_rejected_admin_credentials_fail_admin_scenarios_only() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let store = MockStorefront::new(BASE, MockOptions::default().credentials("terry", "rotated"));

    let (reports, _) = run_suite(&store, &config);
    assert_eq!(
        failed(&reports),
        vec![
            "admin_login",
            "admin_shop_management",
            "admin_content_management",
            "admin_client_management",
            "client_management_back",
            "application_results_back",
            "energy_leak_results_back",
            "add_client_back",
            "product_round_trip",
            "purge_fixture",
            "content_block_round_trip",
        ]
    );
    let login = reports.iter().find(|r| r.name == "admin_login").unwrap();
    assert_eq!(login.failure_kind.as_deref(), Some("timeout"));
    assert!(login.message.as_deref().unwrap().contains("URL to contain '/adminportal'"));
}

#[test]
fn test_capture_failures_never_fail_scenarios() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();
    let config = config(&blocker);

    let options = MockOptions {
        screenshot_error: true,
        ..MockOptions::default()
    };
    let (reports, summary) = run_suite(&MockStorefront::new(BASE, options), &config);
    assert!(summary.all_passed(), "{:?}", failed(&reports));

    let (reports, summary) = run_suite(&MockStorefront::new(BASE, MockOptions::default()), &config);
    assert!(summary.all_passed(), "{:?}", failed(&reports));
    let events: Vec<_> = reports.iter().flat_map(|r| r.events.iter()).collect();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.artifact.is_none()));
}

#[test]
fn test_leftover_fixture_is_purged() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let store = MockStorefront::new(BASE, MockOptions::default().list_lag(1));
    store.seed_product("test", "test");

    let runner = ScenarioRunner::from_config(&config, Box::new(store.clone()));
    let scenario = StorefrontSuite::new(&config).purge_fixture().unwrap();

    let report = runner.run(&scenario);
    assert!(report.passed, "{:?}", report.message);
    assert_eq!(report.steps_completed, report.steps_total);
    assert_eq!(store.product_count("test"), 0);

    // Nothing left: the scenario stops right after the zero count
    let report = runner.run(&scenario);
    assert!(report.passed, "{:?}", report.message);
    assert!(report.steps_completed < report.steps_total);
}

#[test]
fn test_leftover_content_block_is_removed_by_cleanup() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let store = MockStorefront::new(BASE, MockOptions::default());
    store.seed_content_block("About Block Title");

    let runner = ScenarioRunner::from_config(&config, Box::new(store.clone()));
    let report = runner.run(&StorefrontSuite::new(&config).content_block_round_trip().unwrap());
    assert!(report.passed, "{:?}", report.message);
    assert_eq!(store.content_block_count("About Block Title"), 0);
}

#[test]
fn test_missing_delete_dialog_fails_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let options = MockOptions {
        confirm_delete: false,
        ..MockOptions::default().list_lag(0)
    };
    let store = MockStorefront::new(BASE, options);

    let runner = ScenarioRunner::from_config(&config, Box::new(store.clone()));
    let report = runner.run(&StorefrontSuite::new(&config).product_round_trip().unwrap());
    assert!(!report.passed);
    assert_eq!(report.failure_kind.as_deref(), Some("timeout"));
    assert!(report.message.as_deref().unwrap().contains("a dialog to open"));
    assert_eq!(store.product_count("test"), 0);
}

#[test]
fn test_single_add_raises_quantity_by_one() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());
    let store = MockStorefront::new(BASE, MockOptions::default());
    let runner = ScenarioRunner::from_config(&config, Box::new(store.clone()))
        .with_recorder(ActionRecorder::disabled());

    let yoga = Probe::Quantity(markup::cart_quantity("Yoga Lessons"));
    let meditation = Probe::Quantity(markup::cart_quantity("Guided Meditation"));
    let short = config.browser.short_timeout;
    let add = |slug: &str| {
        vec![
            Step::navigate(routes::product(slug)),
            Step::click(markup::add_to_cart_button(), short),
            Step::wait_for(storefront_harness::Condition::url_contains(routes::CART), short),
        ]
    };

    for start in 0..3 {
        let mut browser = store.browser();
        let mut ctx = ScenarioContext::default();
        let mut steps = vec![Step::navigate(routes::CART)];
        for _ in 0..start {
            steps.extend(add("yoga"));
        }
        steps.extend(add("meditation"));
        steps.push(Step::measure("yoga", yoga.clone(), short));
        steps.push(Step::measure("meditation", meditation.clone(), short));
        steps.extend(add("yoga"));
        steps.push(Step::await_value(
            yoga.clone(),
            Expected::Relative {
                key: "yoga".into(),
                delta: 1,
            },
            short,
        ));
        steps.push(Step::await_value(
            meditation.clone(),
            Expected::Relative {
                key: "meditation".into(),
                delta: 0,
            },
            short,
        ));

        for step in &steps {
            runner
                .step(&mut browser, step, &mut ctx)
                .unwrap_or_else(|e| panic!("start {}: {} failed: {}", start, step.describe(), e));
        }
        assert_eq!(ctx.value("yoga").unwrap(), start);
        browser.quit().unwrap();
    }
}
