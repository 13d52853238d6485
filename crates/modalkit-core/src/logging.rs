#![forbid(unsafe_code)]

//! JSON log output for production hosts.
//!
//! Enabled by the `tracing-json` feature. The filter is read from
//! `MODALKIT_LOG` (same syntax as `RUST_LOG`), defaulting to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "MODALKIT_LOG";

/// Build the filter from [`LOG_ENV`], falling back to `info`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global JSON subscriber.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_json_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok()
}
