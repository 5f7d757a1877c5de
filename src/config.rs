//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the harness, supporting:
//! - Environment variables for all configurable values
//! - Legacy variable names used by older suites
//! - Builder-style overrides for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STOREFRONT_BASE_URL` | Root URL of the application under test | `https://graceful-living-web-application.onrender.com` |
//! | `STOREFRONT_WEBDRIVER_URL` | WebDriver endpoint (chromedriver) | `http://localhost:9515` |
//! | `STOREFRONT_ADMIN_USERNAME` | Administrator username | `terry` |
//! | `STOREFRONT_ADMIN_PASSWORD` | Administrator password | `changeme` |
//! | `STOREFRONT_ARTIFACT_DIR` | Directory for click screenshots | `screenshots` |
//! | `STOREFRONT_SHORT_TIMEOUT_MS` | Timeout for fast UI transitions | `5000` |
//! | `STOREFRONT_LONG_TIMEOUT_MS` | Timeout for slow page loads and list refreshes | `15000` |
//! | `STOREFRONT_POLL_INTERVAL_MS` | Interval between condition evaluations | `250` |
//! | `STOREFRONT_HEADLESS` | Run the browser without a window | `true` |
//! | `STOREFRONT_CATALOG_SLUG` | Slug of the catalog item used by cart scenarios | `yoga` |
//! | `STOREFRONT_CATALOG_ITEM` | Display name of that item in the cart | `Yoga Lessons` |
//! | `STOREFRONT_FIXTURE_TITLE` | Title of the product created by admin scenarios | `test` |
//! | `STOREFRONT_FIXTURE_IMAGE` | Image uploaded with the product and content fixtures | unset |
//! | `STOREFRONT_CONTENT_TITLE` | About Us block created by the suite | `About Block Title` |
//!
//! # Example
//!
//! ```bash
//! # Point the suite at a local build of the application
//! export STOREFRONT_BASE_URL="http://localhost:8080"
//! export STOREFRONT_ADMIN_USERNAME="admin"
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

// ============================================================================
// Default Values
// ============================================================================

/// Default root URL of the application under test
pub const DEFAULT_BASE_URL: &str = "https://graceful-living-web-application.onrender.com";

/// Default WebDriver endpoint (chromedriver's default port)
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Default administrator username
pub const DEFAULT_ADMIN_USERNAME: &str = "terry";

/// Default administrator password
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme";

/// Default artifact directory
pub const DEFAULT_ARTIFACT_DIR: &str = "screenshots";

/// Default timeout for fast transitions (milliseconds)
pub const DEFAULT_SHORT_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for slow loads (milliseconds)
pub const DEFAULT_LONG_TIMEOUT_MS: u64 = 15_000;

/// Default polling interval (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default catalog slug used by the cart scenarios
pub const DEFAULT_CATALOG_SLUG: &str = "yoga";

/// Default catalog item display name
pub const DEFAULT_CATALOG_ITEM: &str = "Yoga Lessons";

/// Default product fixture title
pub const DEFAULT_FIXTURE_TITLE: &str = "test";

/// Default About Us content block title
pub const DEFAULT_CONTENT_TITLE: &str = "About Block Title";

/// Default product fixture price (whole dollars)
pub const DEFAULT_FIXTURE_PRICE: u32 = 100;

/// Default product fixture stock count
pub const DEFAULT_FIXTURE_STOCK: u32 = 1;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_BASE_URL: &str = "STOREFRONT_BASE_URL";
pub const ENV_WEBDRIVER_URL: &str = "STOREFRONT_WEBDRIVER_URL";
pub const ENV_ADMIN_USERNAME: &str = "STOREFRONT_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "STOREFRONT_ADMIN_PASSWORD";
pub const ENV_ARTIFACT_DIR: &str = "STOREFRONT_ARTIFACT_DIR";
pub const ENV_SHORT_TIMEOUT: &str = "STOREFRONT_SHORT_TIMEOUT_MS";
pub const ENV_LONG_TIMEOUT: &str = "STOREFRONT_LONG_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL: &str = "STOREFRONT_POLL_INTERVAL_MS";
pub const ENV_HEADLESS: &str = "STOREFRONT_HEADLESS";
pub const ENV_CATALOG_SLUG: &str = "STOREFRONT_CATALOG_SLUG";
pub const ENV_CATALOG_ITEM: &str = "STOREFRONT_CATALOG_ITEM";
pub const ENV_FIXTURE_TITLE: &str = "STOREFRONT_FIXTURE_TITLE";
pub const ENV_FIXTURE_IMAGE: &str = "STOREFRONT_FIXTURE_IMAGE";
pub const ENV_CONTENT_TITLE: &str = "STOREFRONT_CONTENT_TITLE";

// ============================================================================
// Legacy Environment Variable Support
// ============================================================================

/// Base URL variable read by the pytest suites
pub const ENV_BASE_URL_LEGACY: &str = "TEST_BASE_URL";

/// Admin username variable read by the pytest suites
pub const ENV_ADMIN_USERNAME_LEGACY: &str = "TEST_ADMIN_USERNAME";

/// Admin password variable read by the pytest suites
pub const ENV_ADMIN_PASSWORD_LEGACY: &str = "TEST_ADMIN_PASSWORD";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Errors raised while validating configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Centralized configuration for a harness run
#[derive(Debug, Clone)]
pub struct Config {
    /// Application under test
    pub target: TargetSettings,
    /// Browser and timing settings
    pub browser: BrowserSettings,
    /// Catalog entries the scenarios rely on
    pub fixtures: FixtureSettings,
}

/// Where the application lives and how to log into it
#[derive(Debug, Clone)]
pub struct TargetSettings {
    /// Root URL; routes are joined onto it
    pub base_url: String,
    pub admin_username: String,
    pub admin_password: String,
}

/// Browser session settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// WebDriver HTTP endpoint
    pub webdriver_url: String,
    pub headless: bool,
    /// Shared, append-only screenshot directory
    pub artifact_dir: PathBuf,
    pub short_timeout: Duration,
    pub long_timeout: Duration,
    pub poll_interval: Duration,
}

/// Catalog names used by the cart and admin scenarios
#[derive(Debug, Clone)]
pub struct FixtureSettings {
    pub catalog_slug: String,
    pub catalog_item: String,
    pub product_title: String,
    pub product_price: u32,
    pub product_stock: u32,
    pub product_image: Option<PathBuf>,
    pub content_title: String,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            target: TargetSettings::from_env(),
            browser: BrowserSettings::from_env(),
            fixtures: FixtureSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            target: TargetSettings::defaults(),
            browser: BrowserSettings::defaults(),
            fixtures: FixtureSettings::defaults(),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.target.base_url = base_url.into();
        self
    }

    /// Override the artifact directory
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.browser.artifact_dir = dir.into();
        self
    }

    /// Override both wait timeouts
    pub fn with_timeouts(mut self, short: Duration, long: Duration) -> Self {
        self.browser.short_timeout = short;
        self.browser.long_timeout = long;
        self
    }

    /// Override the polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.browser.poll_interval = interval;
        self
    }

    /// Reject values the harness cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.target.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: ENV_BASE_URL,
                value: base.clone(),
                reason: "must be an http(s) URL",
            });
        }
        for (name, value) in [
            (ENV_SHORT_TIMEOUT, self.browser.short_timeout),
            (ENV_LONG_TIMEOUT, self.browser.long_timeout),
            (ENV_POLL_INTERVAL, self.browser.poll_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: "0".to_string(),
                    reason: "must be greater than zero",
                });
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TargetSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(ENV_BASE_URL)
                .or_else(|_| env::var(ENV_BASE_URL_LEGACY))
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            admin_username: env::var(ENV_ADMIN_USERNAME)
                .or_else(|_| env::var(ENV_ADMIN_USERNAME_LEGACY))
                .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: env::var(ENV_ADMIN_PASSWORD)
                .or_else(|_| env::var(ENV_ADMIN_PASSWORD_LEGACY))
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl BrowserSettings {
    pub fn from_env() -> Self {
        Self {
            webdriver_url: env::var(ENV_WEBDRIVER_URL)
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
            headless: env::var(ENV_HEADLESS)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(true),
            artifact_dir: env::var(ENV_ARTIFACT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
            short_timeout: millis_from_env(ENV_SHORT_TIMEOUT, DEFAULT_SHORT_TIMEOUT_MS),
            long_timeout: millis_from_env(ENV_LONG_TIMEOUT, DEFAULT_LONG_TIMEOUT_MS),
            poll_interval: millis_from_env(ENV_POLL_INTERVAL, DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn defaults() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            short_timeout: Duration::from_millis(DEFAULT_SHORT_TIMEOUT_MS),
            long_timeout: Duration::from_millis(DEFAULT_LONG_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl FixtureSettings {
    pub fn from_env() -> Self {
        Self {
            catalog_slug: env::var(ENV_CATALOG_SLUG)
                .unwrap_or_else(|_| DEFAULT_CATALOG_SLUG.to_string()),
            catalog_item: env::var(ENV_CATALOG_ITEM)
                .unwrap_or_else(|_| DEFAULT_CATALOG_ITEM.to_string()),
            product_title: env::var(ENV_FIXTURE_TITLE)
                .unwrap_or_else(|_| DEFAULT_FIXTURE_TITLE.to_string()),
            product_price: DEFAULT_FIXTURE_PRICE,
            product_stock: DEFAULT_FIXTURE_STOCK,
            product_image: env::var(ENV_FIXTURE_IMAGE).ok().map(PathBuf::from),
            content_title: env::var(ENV_CONTENT_TITLE)
                .unwrap_or_else(|_| DEFAULT_CONTENT_TITLE.to_string()),
        }
    }

    pub fn defaults() -> Self {
        Self {
            catalog_slug: DEFAULT_CATALOG_SLUG.to_string(),
            catalog_item: DEFAULT_CATALOG_ITEM.to_string(),
            product_title: DEFAULT_FIXTURE_TITLE.to_string(),
            product_price: DEFAULT_FIXTURE_PRICE,
            product_stock: DEFAULT_FIXTURE_STOCK,
            product_image: None,
            content_title: DEFAULT_CONTENT_TITLE.to_string(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a boolean flag ("1", "true", "yes", "on" and their negatives)
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn millis_from_env(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}
