use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use storefront_harness::browser::{MockOptions, MockStorefront, SessionFactory, WebDriverFactory};
use storefront_harness::harness::{Scenario, ScenarioRunner, StorefrontSuite};
use storefront_harness::report::ResultReporter;
use storefront_harness::snapshot::ActionRecorder;
use storefront_harness::{config, logging};

/// Storefront Harness - browser-driven acceptance tests
#[derive(Parser, Debug)]
#[command(
    name = "storefront-harness",
    about = "Acceptance tests for a storefront and its admin portal, driven through a real browser",
    after_help = "ENVIRONMENT VARIABLES:\n\
        STOREFRONT_BASE_URL          Application root (legacy: TEST_BASE_URL)\n\
        STOREFRONT_WEBDRIVER_URL     WebDriver endpoint (chromedriver)\n\
        STOREFRONT_ADMIN_USERNAME    Admin user (legacy: TEST_ADMIN_USERNAME)\n\
        STOREFRONT_ADMIN_PASSWORD    Admin password (legacy: TEST_ADMIN_PASSWORD)\n\
        STOREFRONT_ARTIFACT_DIR      Screenshot directory\n\
        STOREFRONT_SHORT_TIMEOUT_MS  Wait budget for fast transitions\n\
        STOREFRONT_LONG_TIMEOUT_MS   Wait budget for page loads and list refreshes\n\
        STOREFRONT_FIXTURE_TITLE     Title of the product created and deleted by the suite\n\
        STOREFRONT_CONTENT_TITLE     Title of the About Us block created and deleted by the suite"
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the acceptance suite
    Run {
        /// Application root URL
        #[arg(short, long, env = "STOREFRONT_BASE_URL")]
        base_url: Option<String>,

        /// WebDriver endpoint
        #[arg(short, long, env = "STOREFRONT_WEBDRIVER_URL")]
        webdriver: Option<String>,

        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,

        /// Run against the built-in simulated storefront instead of a browser
        #[arg(long)]
        mock: bool,

        /// Screenshot directory
        #[arg(short, long, env = "STOREFRONT_ARTIFACT_DIR")]
        artifacts: Option<PathBuf>,

        /// Do not capture screenshots
        #[arg(long)]
        no_artifacts: bool,

        /// Run only the named scenarios (repeatable or comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Override both timeouts (ms); useful for the mock
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Debug-level logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the scenarios of the suite
    List,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Run {
            base_url,
            webdriver,
            headed,
            mock,
            artifacts,
            no_artifacts,
            only,
            timeout_ms,
            json,
            verbose,
        } => {
            logging::init(verbose);

            let mut config = config::get().clone();
            if let Some(url) = base_url {
                config = config.with_base_url(url);
            }
            if let Some(url) = webdriver {
                config.browser.webdriver_url = url;
            }
            if headed {
                config.browser.headless = false;
            }
            if let Some(dir) = artifacts {
                config = config.with_artifact_dir(dir);
            }
            if let Some(ms) = timeout_ms {
                config = config.with_timeouts(Duration::from_millis(ms), Duration::from_millis(ms));
            }
            config.validate()?;

            let scenarios = select(StorefrontSuite::new(&config).scenarios()?, &only)?;

            let factory: Box<dyn SessionFactory> = if mock {
                let options = MockOptions::default()
                    .credentials(&config.target.admin_username, &config.target.admin_password);
                Box::new(MockStorefront::new(&config.target.base_url, options))
            } else {
                let browser = &config.browser;
                Box::new(WebDriverFactory::new(&browser.webdriver_url, browser.headless)?)
            };

            let mut runner = ScenarioRunner::from_config(&config, factory);
            if no_artifacts {
                runner = runner.with_recorder(ActionRecorder::disabled());
            }

            tracing::info!(
                "Running {} scenarios against {}",
                scenarios.len(),
                runner.base_url()
            );
            let mut reporter = ResultReporter::new();
            runner.run_suite(&scenarios, &mut reporter);
            let summary = reporter.summarize();

            if json {
                println!("{}", summary.to_json()?);
            } else {
                println!("{}", summary);
            }
            if !summary.all_passed() {
                std::process::exit(1);
            }
        }

        Commands::List => {
            for scenario in StorefrontSuite::new(config::get()).scenarios()? {
                println!("{:<28} {}", scenario.name, scenario.description);
            }
        }
    }

    Ok(())
}

/// Keep the scenarios named in `only`, in suite order; all when empty
fn select(scenarios: Vec<Scenario>, only: &[String]) -> Result<Vec<Scenario>, Box<dyn Error>> {
    if only.is_empty() {
        return Ok(scenarios);
    }
    let known = |name: &String| scenarios.iter().any(|s| &s.name == name);
    if let Some(unknown) = only.iter().find(|name| !known(name)) {
        let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
        let message = format!("Unknown scenario '{}'. Available: {}", unknown, names.join(", "));
        return Err(message.into());
    }
    Ok(scenarios.into_iter().filter(|s| only.contains(&s.name)).collect())
}
