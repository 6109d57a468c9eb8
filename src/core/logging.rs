//! Tracing setup for the yamlform binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const VERBOSE_FILTER: &str = "yamlform=debug";
const DEFAULT_FILTER: &str = "warn";
const QUIET_FILTER: &str = "error";

/// Install a stderr fmt layer; `RUST_LOG` wins over the flags
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else if quiet {
            QUIET_FILTER
        } else {
            DEFAULT_FILTER
        })
    });

    // A second init (e.g. from tests) is not an error worth reporting
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}
