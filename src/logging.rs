//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never mix into mirrored child stdout.

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SHELL_HARNESS_LOG";

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = env::var(LOG_ENV)
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let fmt_layer =
        tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A subscriber installed concurrently by someone else is fine.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt_layer)
        .try_init();
}
