//! Diagnostic logging
//!
//! All diagnostics go to stderr so they never mix with transformed output on
//! stdout. Verbosity is controlled by the SNIP_LOG environment variable
//! (standard tracing filter syntax, e.g. `SNIP_LOG=snip=debug`); the default
//! is warnings only.

use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "SNIP_LOG";

/// Install the global tracing subscriber. Safe to call once per process;
/// a second call (as in the test harness) is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("snip=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
