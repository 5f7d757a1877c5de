//! Logging and tracing configuration.
//!
//! Logs are controlled by the `RUST_LOG` environment variable. The summary
//! printed at the end of a run goes to stdout; logs go to stderr so the two
//! never interleave in captured output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "storefront_harness=info,warn";

/// Filter used with `--verbose`
const VERBOSE_FILTER: &str = "storefront_harness=debug,info";

/// Initialize tracing for the CLI (stderr logging)
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init();
}
