#![forbid(unsafe_code)]

//! Stderr tracing subscriber.

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PLASMA_LOG";

/// Filter used when [`LOG_ENV`] is unset or unparsable. Quiet enough not to
/// scribble over the terminal surface.
pub const DEFAULT_FILTER: &str = "warn";

/// Build the filter from an optional directive string.
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init() {
    let filter = filter_from(env::var(LOG_ENV).ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
