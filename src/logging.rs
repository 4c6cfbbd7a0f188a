//! Diagnostic logging
//!
//! Library code emits `tracing` events; the binary installs a stderr
//! subscriber filtered by `CASEGEN_LOG` (same syntax as `RUST_LOG`).
//! User-facing output does not go through here.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CASEGEN_LOG";

fn filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "casegen=debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
