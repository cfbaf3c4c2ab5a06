//! Diagnostic logging via `tracing`.
//!
//! Logs go to stderr so they never mix with `--ui json` output on stdout.
//! `RUST_LOG` takes precedence; otherwise the level is `warn`, or `debug`
//! for this crate when `--verbose` is given.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,yt2ultrastar=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
